//! Issue drafts and built-in notifiers.
//!
//! Each newly relevant item becomes an [`IssueDraft`]. Filing the issue is
//! left to the tracker: the built-in notifiers either print the draft
//! ([`ConsoleNotifier`]) or append it as one JSON line to an outbox file
//! ([`OutboxNotifier`]) for an external filing job to pick up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use feed_monitor_core::models::RelevantItem;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::reports::Report;
use crate::traits::Notifier;

/// Tracker issue titles are capped at this many characters.
const MAX_TITLE_CHARS: usize = 256;

/// A rendered tracking issue for one relevant item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDraft {
    pub report_id: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub link: String,
    pub score: u32,
}

impl IssueDraft {
    pub fn from_relevant(report: &Report, relevant: &RelevantItem) -> Self {
        let item = &relevant.item;
        let result = &relevant.result;

        let title: String = format!("[{}] {}", report.id, item.title)
            .chars()
            .take(MAX_TITLE_CHARS)
            .collect();

        let published = item
            .published_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let categories: Vec<&str> = result.categories.iter().map(|c| c.tag()).collect();

        let mut body = String::new();
        body.push_str(&format!("## {}\n\n", item.title));
        body.push_str(&format!("**Link:** {}\n", item.link));
        body.push_str(&format!(
            "**Source:** {} ({})\n",
            item.source_name, item.source_category
        ));
        body.push_str(&format!("**Published:** {}\n", published));
        body.push_str(&format!("**Relevance score:** {}\n", result.score));
        body.push_str(&format!(
            "**Matched keywords:** {}\n",
            result.matched_keywords.join(", ")
        ));
        body.push_str(&format!("**Categories:** {}\n", categories.join(", ")));
        if !item.description.is_empty() {
            body.push_str("\n### Summary\n\n");
            body.push_str(&item.description);
            body.push('\n');
        }
        body.push_str(&format!(
            "\n---\nReview whether this affects the **{}** report.\n",
            report.name
        ));

        let mut labels = vec!["feed-monitor".to_string(), format!("report:{}", report.id)];
        labels.extend(categories.iter().map(|c| format!("keyword:{}", c)));

        Self {
            report_id: report.id.clone(),
            title,
            body,
            labels,
            link: item.link.clone(),
            score: result.score,
        }
    }
}

/// Prints each draft to stdout.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, draft: &IssueDraft) -> Result<()> {
        println!("issue {}", draft.title);
        println!("  labels: {}", draft.labels.join(", "));
        for line in draft.body.lines() {
            println!("  | {}", line);
        }
        Ok(())
    }
}

/// Appends each draft as a JSON line to an outbox file.
pub struct OutboxNotifier {
    path: PathBuf,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    fn name(&self) -> &str {
        "outbox"
    }

    async fn notify(&self, draft: &IssueDraft) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut line = serde_json::to_string(draft)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open outbox: {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use feed_monitor_core::keywords::{score, KeywordConfig};
    use feed_monitor_core::models::FeedItem;
    use tempfile::TempDir;

    fn report() -> Report {
        Report {
            id: "vercel-aws".to_string(),
            name: "Vercel vs AWS".to_string(),
            threshold: 3,
            feeds: vec![],
            keywords: KeywordConfig {
                exact: vec!["agentcore".to_string()],
                broad: vec!["agent".to_string(), "serverless".to_string()],
                ..Default::default()
            },
        }
    }

    fn relevant() -> RelevantItem {
        let item = FeedItem {
            title: "Bedrock AgentCore now GA".to_string(),
            link: "https://aws.amazon.com/blogs/aws/agentcore-ga/".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2025, 10, 14, 16, 0, 0).unwrap()),
            description: "new agent runtime, no more serverless cold starts".to_string(),
            source_name: "AWS News".to_string(),
            source_category: "aws".to_string(),
        };
        let result = score(
            &feed_monitor_core::keywords::item_text(&item),
            &report().keywords,
        );
        RelevantItem::new(item, result)
    }

    #[test]
    fn test_draft_contents() {
        let draft = IssueDraft::from_relevant(&report(), &relevant());
        assert_eq!(draft.title, "[vercel-aws] Bedrock AgentCore now GA");
        assert_eq!(draft.score, 5);
        assert!(draft.body.contains("https://aws.amazon.com/blogs/aws/agentcore-ga/"));
        assert!(draft.body.contains("2025-10-14 16:00 UTC"));
        assert!(draft.body.contains("agentcore, agent, serverless"));
        assert!(draft.labels.contains(&"report:vercel-aws".to_string()));
        assert!(draft.labels.contains(&"keyword:exact".to_string()));
        assert!(draft.labels.contains(&"keyword:broad".to_string()));
    }

    #[test]
    fn test_draft_title_is_truncated() {
        let mut relevant = relevant();
        relevant.item.title = "x".repeat(400);
        let draft = IssueDraft::from_relevant(&report(), &relevant);
        assert_eq!(draft.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[tokio::test]
    async fn test_outbox_appends_json_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("issues.jsonl");
        let notifier = OutboxNotifier::new(&path);
        let draft = IssueDraft::from_relevant(&report(), &relevant());

        notifier.notify(&draft).await.unwrap();
        notifier.notify(&draft).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["report_id"], "vercel-aws");
        assert_eq!(parsed["score"], 5);
    }
}
