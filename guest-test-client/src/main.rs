use anyhow::Result;
use clap::Parser;
use colored::*;

mod api_client;
mod guest_client;
mod output;
mod scenarios;

use api_client::ApiClient;
use output::print_test_summary;

#[derive(Parser)]
#[command(name = "guest-test-client")]
#[command(about = "Guest WebSocket Integration Testing Tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:4000)
    #[arg(long)]
    base_url: String,

    /// Guest id prefix; each scenario appends its own suffix
    #[arg(long, default_value = "test-guest")]
    guest_id: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Open a connection and check its status
    ConnectionTest,
    /// Deliver a message over HTTP to a connected guest
    RoundTrip,
    /// Check a guest in and expect a notification
    CheckIn,
    /// Reconnect a guest and expect the old socket closed
    Reconnect,
    /// Close a guest's connection over HTTP
    Close,
    /// Run all tests
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());
    let api_client = ApiClient::new(reqwest::Client::new(), cli.base_url.clone());
    println!("{} Targeting {}", "→".blue(), cli.base_url);

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let base_url = cli.base_url.as_str();
    let guest = |suffix: &str| format!("{}-{}", cli.guest_id, suffix);
    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::ConnectionTest => {
            results.push(scenarios::test_connection(base_url, &guest("connect"), &api_client).await?);
        }
        ScenarioChoice::RoundTrip => {
            results.push(
                scenarios::test_message_round_trip(base_url, &guest("round-trip"), &api_client)
                    .await?,
            );
        }
        ScenarioChoice::CheckIn => {
            results.push(scenarios::test_check_in(base_url, &guest("check-in"), &api_client).await?);
        }
        ScenarioChoice::Reconnect => {
            results
                .push(scenarios::test_reconnect(base_url, &guest("reconnect"), &api_client).await?);
        }
        ScenarioChoice::Close => {
            results.push(scenarios::test_close(base_url, &guest("close"), &api_client).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(base_url, &guest("connect"), &api_client).await?);
            results.push(
                scenarios::test_message_round_trip(base_url, &guest("round-trip"), &api_client)
                    .await?,
            );
            results.push(scenarios::test_check_in(base_url, &guest("check-in"), &api_client).await?);
            results
                .push(scenarios::test_reconnect(base_url, &guest("reconnect"), &api_client).await?);
            results.push(scenarios::test_close(base_url, &guest("close"), &api_client).await?);
        }
    }

    // Print summary
    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
