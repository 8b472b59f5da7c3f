use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "joymap-ctl")]
#[command(about = "Management CLI for the joystick mapping service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored mapping
    Show,
    /// Merge a JSON patch file into the mapping and restart the driver
    Apply {
        /// Path to the JSON patch
        file: PathBuf,
    },
    /// Print the recent service and driver log lines
    Logs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Show => {
            let res = client.get(format!("{}/mapping", base)).send().await?;
            print_json(res).await?;
        }
        Commands::Apply { file } => {
            let body = tokio::fs::read(&file).await?;
            // Reject invalid JSON before it reaches the service.
            serde_json::from_slice::<Value>(&body)?;
            let res = client
                .post(format!("{}/mapping", base))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Logs => {
            let res = client.get(format!("{}/api/logs", base)).send().await?;
            let status = res.status();
            if !status.is_success() {
                return report_failure(res).await;
            }
            let json: Value = res.json().await?;
            if let Some(lines) = json.get("logs").and_then(Value::as_array) {
                for line in lines.iter().filter_map(Value::as_str) {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if !res.status().is_success() {
        return report_failure(res).await;
    }
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if !res.status().is_success() {
        return report_failure(res).await;
    }
    println!("{}", res.text().await?);
    Ok(())
}

async fn report_failure(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    eprintln!("Error: service returned status {}", status);
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    std::process::exit(1);
}
