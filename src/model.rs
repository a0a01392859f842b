/// A fal endpoint offered in the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KnownModel {
    /// Menu key typed by the user
    pub key: &'static str,
    pub endpoint: &'static str,
    pub description: &'static str,
}

/// Models offered by default, in menu order.
pub static KNOWN_MODELS: &[KnownModel] = &[
    KnownModel {
        key: "1",
        endpoint: "fal-ai/imagen4/preview",
        description: "Imagen4 Ultra ($0.03 per image)",
    },
    KnownModel {
        key: "2",
        endpoint: "fal-ai/bytedance/dreamina/v3.1/text-to-image",
        description: "Dreamina v3.1 ($0.03 per image)",
    },
    KnownModel {
        key: "3",
        endpoint: "fal-ai/bytedance/seedream/v4/text-to-image",
        description: "Seedream v4",
    },
    KnownModel {
        key: "4",
        endpoint: "fal-ai/flux-pro/v1.1-ultra",
        description: "FLUX Pro v1.1 Ultra",
    },
    KnownModel {
        key: "5",
        endpoint: "fal-ai/ideogram/v3",
        description: "Ideogram v3",
    },
];

/// Looks up a model by its menu key.
#[inline]
pub fn find<'a>(models: &'a [KnownModel], key: &str) -> Option<&'a KnownModel> {
    models.iter().find(|x| x.key == key)
}

/// Name used for output files: the second and third path segments joined by `-`.
///
/// `fal-ai/flux-pro/v1.1-ultra` becomes `flux-pro-v1.1-ultra`. Identifiers without `/` are kept as-is.
pub fn display_name(model: &str) -> String {
    if !model.contains('/') {
        return model.to_string();
    }

    return model.split('/').skip(1).take(2).collect::<Vec<_>>().join("-");
}

/// Last path segment of the identifier, for summaries.
#[inline]
pub fn short_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}
