//! Test Prediction Client
//!
//! Generates customer usage forms and submits them to a running service.

use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Form body matching the service's `/predict` fields
#[derive(Debug, Clone, Serialize)]
struct CustomerForm {
    account_length: u32,
    area_code: u32,
    intl_plan: &'static str,
    vmail_plan: &'static str,
    vmail_messages: u32,
    total_day_minutes: f64,
    total_day_calls: u32,
    total_eve_minutes: f64,
    total_eve_calls: u32,
    total_night_minutes: f64,
    total_night_calls: u32,
    total_intl_minutes: f64,
    total_intl_calls: u32,
    cust_serv_calls: u32,
}

/// Customer generator for testing
struct CustomerGenerator {
    rng: rand::rngs::ThreadRng,
}

impl CustomerGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Long-tenured customer with moderate usage and few support calls
    fn generate_loyal(&mut self) -> CustomerForm {
        let vmail_plan = self.rng.gen_bool(0.3);

        CustomerForm {
            account_length: self.rng.gen_range(60..240),
            area_code: self.random_area_code(),
            intl_plan: "No",
            vmail_plan: yes_no(vmail_plan),
            vmail_messages: if vmail_plan { self.rng.gen_range(10..50) } else { 0 },
            total_day_minutes: self.minutes(100.0..220.0),
            total_day_calls: self.rng.gen_range(20..40),
            total_eve_minutes: self.minutes(120.0..250.0),
            total_eve_calls: self.rng.gen_range(10..30),
            total_night_minutes: self.minutes(120.0..260.0),
            total_night_calls: self.rng.gen_range(5..20),
            total_intl_minutes: self.minutes(0.0..12.0),
            total_intl_calls: self.rng.gen_range(0..6),
            cust_serv_calls: self.rng.gen_range(0..3),
        }
    }

    /// International plan, heavy day usage and repeated support calls
    fn generate_at_risk(&mut self) -> CustomerForm {
        CustomerForm {
            account_length: self.rng.gen_range(1..60),
            area_code: self.random_area_code(),
            intl_plan: "Yes",
            vmail_plan: "No",
            vmail_messages: 0,
            total_day_minutes: self.minutes(220.0..350.0),
            total_day_calls: self.rng.gen_range(90..140),
            total_eve_minutes: self.minutes(150.0..300.0),
            total_eve_calls: self.rng.gen_range(80..120),
            total_night_minutes: self.minutes(150.0..300.0),
            total_night_calls: self.rng.gen_range(80..120),
            total_intl_minutes: self.minutes(10.0..20.0),
            total_intl_calls: self.rng.gen_range(2..10),
            cust_serv_calls: self.rng.gen_range(4..9),
        }
    }

    fn minutes(&mut self, range: std::ops::Range<f64>) -> f64 {
        (self.rng.gen_range(range) * 10.0).round() / 10.0
    }

    fn random_area_code(&mut self) -> u32 {
        [408, 415, 510][self.rng.gen_range(0..3)]
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Coarse reading of the rendered result page
fn summarize(body: &str) -> &'static str {
    if body.starts_with("Error:") {
        "error"
    } else if body.contains("class=\"churn\"") {
        "churn"
    } else {
        "no_churn"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    info!("Starting Test Prediction Client");

    let args: Vec<String> = std::env::args().collect();
    let base_url = args.get(1).map(|s| s.as_str()).unwrap_or("http://127.0.0.1:5000");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20);
    let risk_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let delay_ms: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        base_url = %base_url,
        count = count,
        risk_rate = risk_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = reqwest::Client::new();
    let health_url = format!("{base_url}/health");
    if let Err(e) = client.get(&health_url).send().await {
        warn!(error = %e, "Service unreachable. Running in dry-run mode.");
        return run_dry_mode(count, risk_rate);
    }

    let predict_url = format!("{base_url}/predict");
    let mut generator = CustomerGenerator::new();
    let mut rng = rand::thread_rng();
    let (mut churn, mut no_churn, mut errors) = (0u64, 0u64, 0u64);

    for i in 0..count {
        let form = if rng.gen_bool(risk_rate) {
            generator.generate_at_risk()
        } else {
            generator.generate_loyal()
        };

        let body = client
            .post(&predict_url)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        match summarize(&body) {
            "churn" => churn += 1,
            "no_churn" => no_churn += 1,
            _ => {
                errors += 1;
                warn!(response = %body, "Prediction request failed");
            }
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Submitted {}/{} customers ({} churn, {} no churn, {} errors)",
                i + 1,
                count,
                churn,
                no_churn,
                errors
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Submitted {} customers ({} churn, {} no churn, {} errors)",
        count, churn, no_churn, errors
    );

    Ok(())
}

fn run_dry_mode(count: u64, risk_rate: f64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no service connection)");

    let mut generator = CustomerGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let form = if rng.gen_bool(risk_rate) {
            generator.generate_at_risk()
        } else {
            generator.generate_loyal()
        };

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample customer {}:\n{}", i + 1, serde_json::to_string_pretty(&form)?);
        }
    }

    Ok(())
}
