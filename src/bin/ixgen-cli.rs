use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "ixgen-cli")]
#[command(about = "Client for the ixgen registry and configuration generator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8001")]
    url: String,

    /// Submission namespace configured on the server.
    #[arg(short, long, default_value = "ixgen")]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render router configuration from a JSON exchange configuration file
    Generate {
        vendor: String,
        style: String,
        /// Operator's own ASN; its sessions are left out
        #[arg(long)]
        asn: Option<u32>,
        file: PathBuf,
    },
    /// List exchanges, optionally filtered by name
    Ix {
        #[arg(long)]
        name: Option<String>,
    },
    /// Look up a network by ASN
    Net { asn: u32 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Generate {
            vendor,
            style,
            asn,
            file,
        } => {
            let body = std::fs::read(&file)?;
            let mut url = format!("{}/{}/{}/{}", base, cli.namespace, vendor, style);
            if let Some(asn) = asn {
                url.push_str(&format!("/{}", asn));
            }
            let res = client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Ix { name } => {
            let mut req = client.get(format!("{}/api/ix", base));
            if let Some(name) = name {
                req = req.query(&[("name", name)]);
            }
            print_json(req.send().await?).await?;
        }
        Commands::Net { asn } => {
            let res = client
                .get(format!("{}/api/net", base))
                .query(&[("asn", asn)])
                .send()
                .await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprintln!("Response: {}", text);
        std::process::exit(1);
    }
    print!("{}", text);
    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: registry returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
