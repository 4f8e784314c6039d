use serde::{de, Deserialize, Deserializer, Serialize};

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned primary key
    pub id: i64,
    #[sqlx(rename = "btitle")]
    pub title: String,
    #[sqlx(rename = "bauthor")]
    pub author: String,
    /// Translator or editor
    #[sqlx(rename = "bperson")]
    pub person: String,
    #[sqlx(rename = "bpub_date")]
    pub pub_date: String,
    #[sqlx(rename = "bread")]
    pub read_status: String,
    #[sqlx(rename = "bcomment")]
    pub comment: String,
}

/// Every non-key column. Create and update both require all six.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookFields {
    #[serde(rename = "btitle", deserialize_with = "trimmed")]
    pub title: String,
    #[serde(rename = "bauthor", deserialize_with = "trimmed")]
    pub author: String,
    #[serde(rename = "bperson", deserialize_with = "trimmed")]
    pub person: String,
    #[serde(rename = "bpub_date", deserialize_with = "trimmed")]
    pub pub_date: String,
    #[serde(rename = "bread", deserialize_with = "trimmed")]
    pub read_status: String,
    #[serde(rename = "bcomment", deserialize_with = "trimmed")]
    pub comment: String,
}

/// Full-row replacement keyed by `bid`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateBook {
    #[serde(rename = "bid", deserialize_with = "record_id")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: BookFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteBook {
    #[serde(deserialize_with = "record_id")]
    pub id: i64,
}

/// Acknowledgment returned by every write.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub data: &'static str,
}

impl Ack {
    pub const ADDED: Ack = Ack {
        data: "added successfully",
    };
    pub const UPDATED: Ack = Ack {
        data: "updated successfully",
    };
    pub const DELETED: Ack = Ack {
        data: "deleted successfully",
    };
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_owned())
}

/// Ids arrive as JSON numbers or as strings (form values are always strings).
fn record_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id `{text}`"))),
    }
}
