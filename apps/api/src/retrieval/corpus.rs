//! Best-practice corpus: a CSV of exemplary answers and the follow-up question each one earned.

use anyhow::{anyhow, Context, Result};
use aws_sdk_s3::Client as S3Client;
use tracing::info;

const ANSWER_COLUMN: &str = "Answer";
const FOLLOW_UP_COLUMN: &str = "Follow-Up Question";

/// Downloads the corpus CSV from object storage and returns one document per row.
pub async fn load_from_s3(s3: &S3Client, bucket: &str, key: &str) -> Result<Vec<String>> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| anyhow!("S3 download of s3://{bucket}/{key} failed: {e}"))?;

    let bytes = object
        .body
        .collect()
        .await
        .with_context(|| format!("reading s3://{bucket}/{key}"))?
        .into_bytes();

    let documents = parse_documents(&bytes)?;
    info!(
        "Loaded {} best-practice documents from s3://{}/{}",
        documents.len(),
        bucket,
        key
    );
    Ok(documents)
}

/// Joins the answer and follow-up columns of each row with a space.
/// Rows where both cells are blank are skipped.
pub fn parse_documents(csv_bytes: &[u8]) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_bytes);

    let headers = reader.headers().context("corpus CSV has no header row")?.clone();
    let answer_idx = column_index(&headers, ANSWER_COLUMN)?;
    let follow_up_idx = column_index(&headers, FOLLOW_UP_COLUMN)?;

    let mut documents = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("corpus CSV row {}", line + 2))?;
        let answer = record.get(answer_idx).unwrap_or_default();
        let follow_up = record.get(follow_up_idx).unwrap_or_default();
        if answer.is_empty() && follow_up.is_empty() {
            continue;
        }
        documents.push(format!("{answer} {follow_up}").trim().to_string());
    }
    Ok(documents)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow!("corpus CSV is missing the '{name}' column"))
}
