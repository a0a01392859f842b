use crate::{
    download::save_url,
    error::Result,
    generate::{Generator, Metadata},
    model::display_name,
};
use chrono::Local;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Result of running one model in an experiment.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success {
        url: String,
        filepath: PathBuf,
        metadata: Box<Metadata>,
    },
    Failure {
        error: String,
    },
}

/// Outcomes of one prompt run against several models, in the order they were attempted.
///
/// Serializes as a JSON object keyed by model identifier.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<(String, Outcome)>,
}

/// Progress notifications emitted while an experiment runs.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started {
        /// One-based position in the batch
        index: usize,
        total: usize,
        model: &'a str,
        name: &'a str,
    },
    Finished {
        model: &'a str,
        name: &'a str,
        outcome: &'a Outcome,
    },
}

impl Outcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    #[inline]
    pub fn filepath(&self) -> Option<&Path> {
        match self {
            Outcome::Success { filepath, .. } => Some(filepath.as_path()),
            Outcome::Failure { .. } => None,
        }
    }

    #[inline]
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error.as_str()),
        }
    }
}

impl Report {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn successes(&self) -> usize {
        self.entries.iter().filter(|(_, x)| x.is_success()).count()
    }

    pub fn get(&self, model: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find_map(|(id, outcome)| (id == model).then_some(outcome))
    }

    #[inline]
    pub fn contains(&self, model: &str) -> bool {
        self.get(model).is_some()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.entries.iter().map(|(id, outcome)| (id.as_str(), outcome))
    }

    #[inline]
    fn push(&mut self, model: String, outcome: Outcome) {
        debug_assert!(!self.contains(&model));
        self.entries.push((model, outcome));
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            url: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            filepath: Option<&'a Path>,
            #[serde(skip_serializing_if = "Option::is_none")]
            metadata: Option<&'a Metadata>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        let entry = match self {
            Outcome::Success {
                url,
                filepath,
                metadata,
            } => Entry {
                success: true,
                url: Some(url.as_str()),
                filepath: Some(filepath.as_path()),
                metadata: Some(metadata.as_ref()),
                error: None,
            },
            Outcome::Failure { error } => Entry {
                success: false,
                url: None,
                filepath: None,
                metadata: None,
                error: Some(error.as_str()),
            },
        };

        return entry.serialize(serializer);
    }
}

impl Serialize for Report {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Generator {
    /// Runs `prompt` against every model in `models`, one after the other.
    ///
    /// Images are saved under `save_dir` inside the output directory, or directly in it when `None`.
    /// Failures are recorded per model and never stop the batch; only failing to create the
    /// output directory aborts the whole call.
    #[inline]
    pub async fn experiment_with_models<S: AsRef<str>>(
        &self,
        prompt: &str,
        models: &[S],
        save_dir: Option<&str>,
    ) -> Result<Report> {
        return self
            .experiment_with_progress(prompt, models, save_dir, |_| {})
            .await;
    }

    /// Same as [`experiment_with_models`](Self::experiment_with_models), reporting progress to `on_progress`.
    pub async fn experiment_with_progress<S, F>(
        &self,
        prompt: &str,
        models: &[S],
        save_dir: Option<&str>,
        mut on_progress: F,
    ) -> Result<Report>
    where
        S: AsRef<str>,
        F: FnMut(Progress<'_>),
    {
        let save_path = match save_dir {
            Some(dir) => {
                let path = self.images_dir().join(dir);
                tokio::fs::create_dir_all(&path).await?;
                path
            }
            None => self.images_dir().to_path_buf(),
        };

        let mut models: Vec<&str> = models.iter().map(AsRef::as_ref).collect();
        let mut seen = std::collections::HashSet::new();
        models.retain(|x| seen.insert(*x));

        #[cfg(feature = "tracing")]
        tracing::info!(count = models.len(), prompt, "starting experiment");

        let total = models.len();
        let mut report = Report::default();

        for (i, model) in models.into_iter().enumerate() {
            let name = display_name(model);
            on_progress(Progress::Started {
                index: i + 1,
                total,
                model,
                name: &name,
            });

            let outcome = match self.generate_and_save(prompt, model, &name, &save_path).await {
                Ok((url, filepath, metadata)) => Outcome::Success {
                    url,
                    filepath,
                    metadata: Box::new(metadata),
                },
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(model, error = %e, "model failed");

                    Outcome::Failure {
                        error: e.to_string(),
                    }
                }
            };

            on_progress(Progress::Finished {
                model,
                name: &name,
                outcome: &outcome,
            });
            report.push(model.to_string(), outcome);
        }

        return Ok(report);
    }

    async fn generate_and_save(
        &self,
        prompt: &str,
        model: &str,
        name: &str,
        save_path: &Path,
    ) -> Result<(String, PathBuf, Metadata)> {
        let (url, mut metadata) = self.generate_image(prompt, model).await?.into_parts();

        let stem = format!("{name}_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let (filepath, _) = save_url(self.client(), &url, save_path, &stem).await?;

        metadata.local_file = Some(filepath.clone());
        return Ok((url, filepath, metadata));
    }
}
