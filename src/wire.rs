use serde::Deserialize;

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Integer on success, string identifier on some error responses.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<DataContainer<T>>,
}

#[derive(Debug, Deserialize)]
pub struct DataContainer<T> {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
    pub count: u64,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Character {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Comic {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}
