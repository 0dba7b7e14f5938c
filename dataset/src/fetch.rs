//! Downloads pre-parsed demo archives from the ESTA dataset.

fn online_url(demo_id: &str) -> String {
    format!(
        "https://github.com/pnxenopoulos/esta/blob/main/data/online/{}.json.xz?raw=true",
        demo_id
    )
}

fn lan_url(demo_id: &str) -> String {
    format!(
        "https://github.com/pnxenopoulos/esta/blob/main/data/lan/{}.json.xz?raw=true",
        demo_id
    )
}

pub struct Fetcher {
    http: reqwest::Client,
    demo_dir: std::path::PathBuf,
}

#[derive(Debug, PartialEq)]
pub enum FetchOutcome {
    /// The archive is already on disk and replace was not requested.
    AlreadyPresent(std::path::PathBuf),
    /// Downloaded and written to disk.
    Fetched(std::path::PathBuf),
    /// Both remote locations answered, but not with the archive. Carries the
    /// final status for the caller to interpret.
    Failed(reqwest::StatusCode),
}

#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Io(std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(value)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Request(e) => write!(f, "requesting archive: {}", e),
            Self::Io(e) => write!(f, "writing archive: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_dir("demos/")
    }

    pub fn with_dir<P>(dir: P) -> Self
    where
        P: Into<std::path::PathBuf>,
    {
        Self {
            http: reqwest::Client::new(),
            demo_dir: dir.into(),
        }
    }

    /// Local path the archive for `demo_id` is stored under.
    pub fn archive_path(&self, demo_id: &str) -> std::path::PathBuf {
        self.demo_dir.join(format!("{}.json.xz", demo_id))
    }

    /// Fetches the `.json.xz` archive for a demo id.
    ///
    /// Tries the online part of the dataset first and falls back to the lan
    /// part on a 404. There is no further retry logic; any other status is
    /// handed back as a [`FetchOutcome::Failed`] value.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, demo_id: &str, replace: bool) -> Result<FetchOutcome, FetchError> {
        if !tokio::fs::try_exists(&self.demo_dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.demo_dir).await?;
            tracing::info!("Created demo directory {:?}", self.demo_dir);
        }

        let path = self.archive_path(demo_id);
        if !replace && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!("Archive already exists, skipping download");
            return Ok(FetchOutcome::AlreadyPresent(path));
        }

        let mut response = self.http.get(online_url(demo_id)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Not in the online data folder, trying the lan one");
            response = self.http.get(lan_url(demo_id)).send().await?;
        }

        if response.status() != reqwest::StatusCode::OK {
            return Ok(FetchOutcome::Failed(response.status()));
        }

        let body = response.bytes().await?;
        tokio::fs::write(&path, &body).await?;

        Ok(FetchOutcome::Fetched(path))
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
