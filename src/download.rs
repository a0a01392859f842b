use crate::{
    client::Client,
    error::{Error, Result},
};
use futures::TryStreamExt;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};

/// Write buffer used while streaming a download to disk
pub const CHUNK_SIZE: usize = 8 * 1024;

const EXTENSION: &str = "jpg";
const MAX_SUFFIX: u32 = 10_000;

/// Streams the body at `url` into a new `<stem>.jpg` file inside `dir`.
///
/// Existing files are never overwritten: if the name is taken, `_2`, `_3`, ... is appended
/// to the stem. Returns the path written and its size in bytes. Non-success statuses and
/// empty bodies are errors and leave no file behind.
pub async fn save_url(
    client: impl AsRef<Client>,
    url: &str,
    dir: impl AsRef<Path>,
    stem: &str,
) -> Result<(PathBuf, u64)> {
    let resp = client.as_ref().get(url).send().await?.error_for_status()?;

    let (file, path) = create_unique(dir.as_ref(), stem).await?;
    let mut stream = resp.bytes_stream();
    let mut file = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut written = 0u64;

    let copied = async {
        while let Some(chunk) = stream.try_next().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(Error::msg("Empty image download"));
        }
        return Result::<()>::Ok(());
    }
    .await;

    if let Err(e) = copied {
        drop(file);
        let _ = tokio::fs::remove_file(&path).await;
        return Err(e);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(path = %path.display(), bytes = written, "image saved");

    return Ok((path, written));
}

/// Creates a file named after `stem` that did not exist before.
async fn create_unique(dir: &Path, stem: &str) -> Result<(File, PathBuf)> {
    for n in 1..=MAX_SUFFIX {
        let path = match n {
            1 => dir.join(format!("{stem}.{EXTENSION}")),
            n => dir.join(format!("{stem}_{n}.{EXTENSION}")),
        };

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    return Err(Error::msg(format!(
        "no free file name for {stem}.{EXTENSION} in {}",
        dir.display()
    )));
}
