use crate::{
    client::Client,
    error::{Error, Result},
    Str,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

/// Request body sent to every model. Only the prompt varies between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments<'a> {
    pub prompt: Str<'a>,
    pub num_images: u32,
}

/// Everything known about a single generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Metadata {
    pub model: String,
    pub prompt: String,
    pub arguments: Arguments<'static>,
    pub timestamp: DateTime<Local>,
    /// Seconds spent waiting on the remote call
    pub time_taken: f64,
    pub response: serde_json::Value,
    /// Set once the image has been saved to disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_file: Option<PathBuf>,
}

/// A successful remote generation, not yet downloaded.
#[derive(Debug, Clone)]
pub struct Generation {
    pub url: String,
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
struct Images {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

/// Runs prompts against fal models and stores the results under an output directory.
#[derive(Debug, Clone)]
pub struct Generator {
    client: Client,
    images_dir: PathBuf,
}

impl<'a> Arguments<'a> {
    #[inline]
    pub fn new(prompt: impl Into<Str<'a>>) -> Self {
        return Self {
            prompt: prompt.into(),
            num_images: 1,
        };
    }

    #[inline]
    pub fn into_owned(self) -> Arguments<'static> {
        return Arguments {
            prompt: Str::Owned(self.prompt.into_owned()),
            num_images: self.num_images,
        };
    }
}

impl Generation {
    #[inline]
    pub fn into_parts(self) -> (String, Metadata) {
        (self.url, self.metadata)
    }
}

impl Generator {
    /// Creates a generator writing into `generated_images/`.
    #[inline]
    pub fn new(client: Client) -> Result<Self> {
        return Self::with_output_dir(client, DEFAULT_OUTPUT_DIR);
    }

    /// Creates a generator writing into `images_dir`, creating it if needed.
    pub fn with_output_dir(client: Client, images_dir: impl Into<PathBuf>) -> Result<Self> {
        let images_dir = images_dir.into();
        std::fs::create_dir_all(&images_dir)?;
        return Ok(Self { client, images_dir });
    }

    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }

    #[inline]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Generates a single image of `prompt` with `model`.
    ///
    /// Exactly one remote call is made. Any failure, including a response without images,
    /// is reported as [`Error::Generation`] with the time spent waiting.
    pub async fn generate_image(&self, prompt: &str, model: &str) -> Result<Generation> {
        let arguments = Arguments::new(prompt);

        #[cfg(feature = "tracing")]
        tracing::info!(model, "generating image");

        let start = Instant::now();
        let result = self.client.run(model, &arguments).await;
        let elapsed = start.elapsed();

        let response = result.map_err(|e| e.generation(elapsed))?;
        let url = match Images::deserialize(&response)
            .ok()
            .and_then(|x| x.images.into_iter().next())
        {
            Some(image) => image.url,
            None => {
                return Err(Error::msg("No image generated in response").generation(elapsed));
            }
        };

        #[cfg(feature = "tracing")]
        tracing::info!(model, elapsed = elapsed.as_secs_f64(), "image generated");

        return Ok(Generation {
            url,
            metadata: Metadata {
                model: model.to_string(),
                prompt: prompt.to_string(),
                arguments: arguments.into_owned(),
                timestamp: Local::now(),
                time_taken: elapsed.as_secs_f64(),
                response,
                local_file: None,
            },
        });
    }
}
