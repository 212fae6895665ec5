//! Stress-testing harness: samples companies, drives a configurable number
//! of concurrent research tasks against a running `research-server`, and
//! classifies each outcome for reliability analysis.
//!
//! Usage:
//!   stress --base-url http://localhost:8080 --count 20 --concurrency 5 \
//!          --strategy mixed --out results.ndjson

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::{rng, Rng};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SamplingStrategy {
    Uniform,
    Stratified,
    EdgeCase,
    Mixed,
}

impl SamplingStrategy {
    fn parse(raw: &str) -> Self {
        match raw {
            "stratified" => Self::Stratified,
            "edge_case" => Self::EdgeCase,
            "mixed" => Self::Mixed,
            _ => Self::Uniform,
        }
    }
}

#[derive(Debug, Clone)]
struct Company {
    ticker: &'static str,
    name: &'static str,
    sector: &'static str,
}

const SP500_SAMPLE: &[Company] = &[
    Company { ticker: "AAPL", name: "Apple Inc.", sector: "Technology" },
    Company { ticker: "MSFT", name: "Microsoft Corporation", sector: "Technology" },
    Company { ticker: "GOOGL", name: "Alphabet Inc.", sector: "Technology" },
    Company { ticker: "AMZN", name: "Amazon.com, Inc.", sector: "Consumer Discretionary" },
    Company { ticker: "NVDA", name: "NVIDIA Corporation", sector: "Technology" },
    Company { ticker: "TSLA", name: "Tesla, Inc.", sector: "Consumer Discretionary" },
    Company { ticker: "JPM", name: "JPMorgan Chase & Co.", sector: "Financials" },
    Company { ticker: "XOM", name: "Exxon Mobil Corporation", sector: "Energy" },
    Company { ticker: "KO", name: "The Coca-Cola Company", sector: "Consumer Staples" },
    Company { ticker: "JNJ", name: "Johnson & Johnson", sector: "Health Care" },
    Company { ticker: "PG", name: "Procter & Gamble Co.", sector: "Consumer Staples" },
    Company { ticker: "UNH", name: "UnitedHealth Group Inc.", sector: "Health Care" },
];

const EDGE_CASES: &[Company] = &[
    Company { ticker: "BRK.B", name: "Berkshire Hathaway Inc.", sector: "Financials" },
    Company { ticker: "ZZZZ", name: "", sector: "Unknown" },
    Company { ticker: "GME", name: "GameStop Corp.", sector: "Consumer Discretionary" },
];

fn sample(n: usize, strategy: SamplingStrategy) -> Vec<Company> {
    let mut rng = rng();
    match strategy {
        SamplingStrategy::Uniform => {
            let mut pool: Vec<Company> = SP500_SAMPLE.to_vec();
            pool.shuffle(&mut rng);
            pool.truncate(n);
            pool
        }
        SamplingStrategy::Stratified => {
            let sectors: Vec<&str> = {
                let mut s: Vec<&str> = SP500_SAMPLE.iter().map(|c| c.sector).collect();
                s.sort_unstable();
                s.dedup();
                s
            };
            let per_sector = (n / sectors.len().max(1)).max(1);
            let mut result = Vec::new();
            for sector in sectors {
                let mut in_sector: Vec<Company> = SP500_SAMPLE.iter().filter(|c| c.sector == sector).cloned().collect();
                in_sector.shuffle(&mut rng);
                result.extend(in_sector.into_iter().take(per_sector));
            }
            result.truncate(n);
            result
        }
        SamplingStrategy::EdgeCase => {
            let mut pool: Vec<Company> = EDGE_CASES.to_vec();
            pool.shuffle(&mut rng);
            pool.truncate(n.min(pool.len()));
            while pool.len() < n {
                pool.push(SP500_SAMPLE[rng.random_range(0..SP500_SAMPLE.len())].clone());
            }
            pool
        }
        SamplingStrategy::Mixed => {
            let edge_n = (n / 10).max(1).min(EDGE_CASES.len());
            let mut result: Vec<Company> = EDGE_CASES[..edge_n].to_vec();
            result.extend(sample(n.saturating_sub(result.len()), SamplingStrategy::Uniform));
            result.shuffle(&mut rng);
            result.truncate(n);
            result
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ResultCategory {
    Success,
    Partial,
    Fallback,
    Transient,
    Persistent,
    HardFailure,
    RateLimited,
    Timeout,
    HfDependency,
    ColdStart,
    Unknown,
}

#[derive(Debug, Serialize)]
struct ClassificationResult {
    ticker: String,
    category: ResultCategory,
    latency_ms: f64,
    completeness_pct: f64,
    sources_failed: usize,
    error_message: Option<String>,
}

fn classify(ticker: &str, outcome: &Result<Value, String>, latency_ms: f64, attempts: u32) -> ClassificationResult {
    match outcome {
        Err(message) => {
            let lower = message.to_lowercase();
            let category = if lower.contains("429") || lower.contains("rate limit") {
                ResultCategory::RateLimited
            } else if lower.contains("timeout") || lower.contains("timed out") {
                ResultCategory::Timeout
            } else if lower.contains("huggingface") || lower.contains("hf.space") {
                ResultCategory::HfDependency
            } else if lower.contains("cold start") {
                ResultCategory::ColdStart
            } else if lower.contains("503") || lower.contains("502") || lower.contains("500") {
                if attempts < 3 { ResultCategory::Transient } else { ResultCategory::Persistent }
            } else if lower.contains("400") || lower.contains("401") || lower.contains("403") || lower.contains("404") {
                ResultCategory::HardFailure
            } else {
                ResultCategory::Unknown
            };
            ClassificationResult { ticker: ticker.to_string(), category, latency_ms, completeness_pct: 0.0, sources_failed: 0, error_message: Some(message.clone()) }
        }
        Ok(task) => {
            let Some(artifact) = task.pointer("/artifacts/0/data") else {
                return ClassificationResult {
                    ticker: ticker.to_string(),
                    category: ResultCategory::HardFailure,
                    latency_ms,
                    completeness_pct: 0.0,
                    sources_failed: 0,
                    error_message: task.get("error").map(ToString::to_string),
                };
            };
            let completeness_pct = artifact.pointer("/completeness/pct").and_then(Value::as_f64).unwrap_or(0.0);
            let failed = artifact.pointer("/sources_failed").and_then(Value::as_array).map_or(0, Vec::len);
            let category = if failed > 0 && failed < 6 {
                ResultCategory::Fallback
            } else if completeness_pct < 50.0 {
                ResultCategory::Partial
            } else {
                ResultCategory::Success
            };
            ClassificationResult { ticker: ticker.to_string(), category, latency_ms, completeness_pct, sources_failed: failed, error_message: None }
        }
    }
}

async fn run_one(client: &reqwest::Client, base_url: &str, company: &Company) -> (Result<Value, String>, f64, u32) {
    let started = Instant::now();
    let message = format!("Research {}", if company.name.is_empty() { company.ticker } else { company.name });

    let send = client
        .post(base_url)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "message/send",
            "params": {"message": {"parts": [{"type": "text", "text": message}]}}
        }))
        .send()
        .await;

    let task_id = match send {
        Ok(resp) => match resp.json::<Value>().await {
            Ok(body) => match body.pointer("/result/task/id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => return (Err(body.pointer("/error/message").map_or("no task id in response".to_string(), |m| m.to_string())), elapsed_ms(started), 1),
            },
            Err(e) => return (Err(e.to_string()), elapsed_ms(started), 1),
        },
        Err(e) => return (Err(e.to_string()), elapsed_ms(started), 1),
    };

    let mut attempts = 1;
    for _ in 0..150 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        attempts += 1;
        let poll = client
            .post(base_url)
            .json(&json!({"jsonrpc": "2.0", "id": 2, "method": "tasks/get", "params": {"taskId": task_id}}))
            .send()
            .await;
        let body = match poll {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(b) => b,
                Err(e) => return (Err(e.to_string()), elapsed_ms(started), attempts),
            },
            Err(e) => return (Err(e.to_string()), elapsed_ms(started), attempts),
        };
        if let Some(err) = body.get("error") {
            return (Err(err.to_string()), elapsed_ms(started), attempts);
        }
        let Some(task) = body.pointer("/result/task") else { continue };
        let status = task.get("status").and_then(Value::as_str).unwrap_or("");
        if matches!(status, "COMPLETED" | "FAILED" | "CANCELED") {
            return (Ok(task.clone()), elapsed_ms(started), attempts);
        }
    }
    (Err("timed out waiting for task completion".to_string()), elapsed_ms(started), attempts)
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let get_flag = |name: &str, default: &str| -> String {
        args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).cloned().unwrap_or_else(|| default.to_string())
    };

    let base_url = get_flag("--base-url", "http://localhost:8080");
    let count: usize = get_flag("--count", "20").parse().unwrap_or(20);
    let concurrency: usize = get_flag("--concurrency", "5").parse().unwrap_or(5);
    let strategy = SamplingStrategy::parse(&get_flag("--strategy", "uniform"));
    let out_path = get_flag("--out", "stress-results.ndjson");

    let companies = sample(count, strategy);
    let client = reqwest::Client::new();

    let mut results = Vec::with_capacity(companies.len());
    for chunk in companies.chunks(concurrency) {
        let futures: Vec<_> = chunk.iter().map(|company| run_one(&client, &base_url, company)).collect();
        let outcomes = futures::future::join_all(futures).await;
        for (company, (outcome, latency_ms, attempts)) in chunk.iter().zip(outcomes) {
            results.push(classify(company.ticker, &outcome, latency_ms, attempts));
        }
    }

    let mut lines = String::new();
    for result in &results {
        lines.push_str(&serde_json::to_string(result)?);
        lines.push('\n');
    }
    std::fs::write(&out_path, &lines)?;

    let success = results.iter().filter(|r| matches!(r.category, ResultCategory::Success | ResultCategory::Partial | ResultCategory::Fallback)).count();
    println!("{}/{} completed without a hard failure; wrote {}", success, results.len(), out_path);

    Ok(())
}
