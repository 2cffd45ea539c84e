use reqwest::Url;

/// One page of results from a list endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
    pub count: u64,
    pub results: Vec<T>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<Image>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comic {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<Image>,
}

/// Image location built from the API's `path` and `extension` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub url: Url,
}
