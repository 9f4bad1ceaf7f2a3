use clap::{Parser, Subcommand};
use reqwest::header::HOST;
use serde_json::json;

use skip_proxy::addr::{demunge, munge, ScionAddr};

#[derive(Parser)]
#[command(name = "skip-cli")]
#[command(about = "Encode, decode and probe munged SCION hostnames", long_about = None)]
struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a browser hostname into the address the proxy dials
    Demunge { host: String },
    /// Encode an ISD-AS,host address as a browser hostname
    Munge { address: String },
    /// Send a GET through a running proxy using a munged Host header
    Fetch {
        #[arg(short, long, default_value = "http://127.0.0.1:8888")]
        proxy: String,
        host: String,
        #[arg(default_value = "/")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demunge { host } => {
            let canonical = demunge(&host);
            if cli.json {
                let address = canonical.parse::<ScionAddr>().ok().map(|addr| {
                    json!({
                        "isd": addr.ia().isd(),
                        "as": addr.ia().asn(),
                        "host": addr.host(),
                    })
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "host": host,
                        "canonical": canonical,
                        "scion": address.is_some(),
                        "address": address,
                    }))?
                );
            } else {
                println!("{}", canonical);
            }
        }
        Commands::Munge { address } => {
            let addr: ScionAddr = address.parse()?;
            let munged = munge(&addr);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "address": addr.to_string(),
                        "munged": munged,
                    }))?
                );
            } else {
                println!("{}", munged);
            }
        }
        Commands::Fetch { proxy, host, path } => {
            let client = reqwest::Client::builder().no_proxy().build()?;
            let url = format!("{}{}", proxy.trim_end_matches('/'), path);
            let res = client.get(url).header(HOST, host.as_str()).send().await?;
            print_response(res, cli.json).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let headers: Vec<(String, String)> = res
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    let body = res.text().await?;

    if as_json {
        let headers: serde_json::Map<String, serde_json::Value> = headers
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "status": status.as_u16(),
                "headers": headers,
                "body": body,
            }))?
        );
        return Ok(());
    }

    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
    }
    println!("{}", status);
    for (k, v) in headers {
        println!("{}: {}", k, v);
    }
    println!();
    println!("{}", body);
    Ok(())
}
