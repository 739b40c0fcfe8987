use augur_core::{CompletionRequest, build_prompt};
use augur_interface::CompletionDriver;
use augur_models::{CostAccountant, OpenAiClient, ReplyClass, classify_reply};
use augur_rate_limit::{AugurConfig, QuotaTracker};

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_scores_a_headline() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AugurConfig::bundled()?;
    let client = OpenAiClient::from_config(&config.endpoint)?;
    let messages = build_prompt(2008, 9, "Lehman Brothers files for bankruptcy", &config.prompt.stock_index);
    let request = CompletionRequest::new(client.model_name(), messages);

    let reply = client.complete(&request).await?;
    let mut quota = QuotaTracker::new();
    assert!(quota.update(reply.headers()), "Endpoint should report its quota");

    match classify_reply(&reply) {
        ReplyClass::Completion(text) => {
            println!("Response: {text}");
            let mut accountant = CostAccountant::from_config(&config.pricing, client.model_name())?;
            assert!(accountant.record(&request, &text) > rust_decimal::Decimal::ZERO);
        }
        ReplyClass::RateLimited { message, .. } => println!("Rate limited: {message}"),
        other => anyhow::bail!("Unexpected reply: {other:?}"),
    }

    Ok(())
}
