use std::path::PathBuf;

use anyhow::Result;

use model::{load_layer, Feature, LayerName, LayerSource};

/// Reads `<dir>/<layer>.json` resources straight off disk.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: PathBuf) -> Result<Self> {
        if !dir.is_dir() {
            bail!("data directory {} doesn't exist", dir.display());
        }
        Ok(Self { dir })
    }
}

impl LayerSource for FileSource {
    fn fetch(&self, name: LayerName) -> Result<Vec<Feature>> {
        let resource = match name.resource() {
            Some(x) => x,
            None => bail!("{name} has no backing resource"),
        };
        let bytes = fs_err::read(self.dir.join(resource))?;
        load_layer(name, &bytes[..])
    }
}

/// Fetches the same resources over HTTP, for when the data is served rather
/// than shipped alongside the binary.
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl LayerSource for HttpSource {
    fn fetch(&self, name: LayerName) -> Result<Vec<Feature>> {
        let resource = match name.resource() {
            Some(x) => x,
            None => bail!("{name} has no backing resource"),
        };
        let response = self
            .client
            .get(format!("{}/{resource}", self.base_url))
            .send()?;
        if !response.status().is_success() {
            bail!("fetching {name} returned {}", response.status());
        }
        let bytes = response.bytes()?;
        load_layer(name, bytes.as_ref())
    }
}
