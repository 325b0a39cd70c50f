pub mod description;
pub mod email;
pub mod faq;
pub mod leadership;
pub mod links;
pub mod overview;
pub mod tech;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured profile pulled out of one company page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub title: String,
    pub meta_description: String,
    pub overview: BTreeMap<String, String>,
    pub tech_stack: Vec<TechEntry>,
    pub email_formats: Vec<EmailFormat>,
    pub faq: Vec<FaqEntry>,
    pub leadership: Vec<Leader>,
    pub social_links: BTreeMap<String, String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechEntry {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailFormat {
    pub pattern: String,
    pub example: String,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    pub name: String,
    pub title: String,
}
