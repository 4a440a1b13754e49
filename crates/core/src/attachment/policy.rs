//! Per-kind upload policies, naming, and content-type resolution.

use std::collections::BTreeSet;

use brightpath_shared::config::StorageConfig;
use uuid::Uuid;

use super::error::AttachmentError;
use super::types::AssetKind;

/// Fallback when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Default content type of course resources.
pub const PDF: &str = "application/pdf";

/// How the stored content type is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeRule {
    /// Look the extension up in the image table.
    FromExtension,
    /// Trust the client's declared type, else use the given default.
    DeclaredOr(&'static str),
}

/// Validation and naming rules for one asset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPolicy {
    kind: AssetKind,
    namespace: String,
    allowed_extensions: Option<BTreeSet<String>>,
    max_size_bytes: Option<u64>,
    content_type: ContentTypeRule,
}

impl AssetPolicy {
    /// Image policy: bounded size, fixed extension set, content type from extension.
    #[must_use]
    pub fn image<I, S>(
        kind: AssetKind,
        namespace: impl Into<String>,
        max_size_bytes: u64,
        allowed_extensions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            kind,
            namespace: namespace.into(),
            allowed_extensions: Some(normalize_set(allowed_extensions)),
            max_size_bytes: Some(max_size_bytes),
            content_type: ContentTypeRule::FromExtension,
        }
    }

    /// Course resource policy: unrestricted and unbounded until hardened.
    #[must_use]
    pub fn resource(namespace: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::CourseResource,
            namespace: namespace.into(),
            allowed_extensions: None,
            max_size_bytes: None,
            content_type: ContentTypeRule::DeclaredOr(PDF),
        }
    }

    /// Set the size cap.
    #[must_use]
    pub fn with_max_size(mut self, max_size_bytes: Option<u64>) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Restrict extensions; `None` accepts any.
    #[must_use]
    pub fn with_allowed_extensions<I, S>(mut self, allowed_extensions: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = allowed_extensions.map(normalize_set);
        self
    }

    /// Asset kind.
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Namespace (bucket / container).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Size cap, if any.
    #[must_use]
    pub const fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_bytes
    }

    /// Whether `extension` (lowercase, no dot) passes this policy.
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .as_ref()
            .is_none_or(|allowed| allowed.contains(extension))
    }

    /// Check an upload against this policy and return its extension.
    ///
    /// Checks run in a fixed order and the first violation wins: empty
    /// content, size, filename, extension.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self, size: u64, filename: Option<&str>) -> Result<String, AttachmentError> {
        if size == 0 {
            return Err(AttachmentError::EmptyFile);
        }

        if let Some(max) = self.max_size_bytes
            && size > max
        {
            return Err(AttachmentError::file_too_large(size, max));
        }

        let filename = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(AttachmentError::InvalidFilename)?;

        let extension = extension_of(filename);
        if !self.allows_extension(&extension) {
            return Err(AttachmentError::UnsupportedType {
                extension,
                allowed: self
                    .allowed_extensions
                    .iter()
                    .flatten()
                    .cloned()
                    .collect(),
            });
        }

        Ok(extension)
    }

    /// Fresh object name: `<prefix>_<uuid-v4>.<ext>`.
    #[must_use]
    pub fn generate_name(&self, extension: &str) -> String {
        let id = Uuid::new_v4();
        let extension = sanitize_extension(extension);
        if extension.is_empty() {
            format!("{}_{id}", self.kind.prefix())
        } else {
            format!("{}_{id}.{extension}", self.kind.prefix())
        }
    }

    /// Content type to store with the object.
    #[must_use]
    pub fn content_type(&self, extension: &str, declared: Option<&str>) -> String {
        match self.content_type {
            ContentTypeRule::FromExtension => content_type_for_extension(extension).to_string(),
            ContentTypeRule::DeclaredOr(default) => declared
                .map(str::trim)
                .filter(|ct| !ct.is_empty())
                .unwrap_or(default)
                .to_string(),
        }
    }
}

/// The three policies, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPolicies {
    profile_image: AssetPolicy,
    course_image: AssetPolicy,
    course_resource: AssetPolicy,
}

impl AssetPolicies {
    /// Build policies from storage configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        let images = &config.images;
        let resources = &config.resources;
        Self {
            profile_image: AssetPolicy::image(
                AssetKind::ProfileImage,
                &config.namespaces.profile_images,
                images.max_size_bytes,
                &images.allowed_extensions,
            ),
            course_image: AssetPolicy::image(
                AssetKind::CourseImage,
                &config.namespaces.course_images,
                images.max_size_bytes,
                &images.allowed_extensions,
            ),
            course_resource: AssetPolicy::resource(&config.namespaces.course_resources)
                .with_max_size(resources.max_size_bytes)
                .with_allowed_extensions(resources.allowed_extensions.as_ref()),
        }
    }

    /// Policy for one kind.
    #[must_use]
    pub const fn get(&self, kind: AssetKind) -> &AssetPolicy {
        match kind {
            AssetKind::ProfileImage => &self.profile_image,
            AssetKind::CourseImage => &self.course_image,
            AssetKind::CourseResource => &self.course_resource,
        }
    }

    /// Namespaces of all kinds.
    #[must_use]
    pub fn namespaces(&self) -> [&str; 3] {
        AssetKind::ALL.map(|kind| self.get(kind).namespace())
    }
}

impl Default for AssetPolicies {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

/// Lowercase text after the last `.`; empty when there is none.
#[must_use]
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// MIME type of a known image extension.
#[must_use]
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => OCTET_STREAM,
    }
}

/// Last path segment of a stored URL; `None` for null or empty input.
#[must_use]
pub fn extract_filename(url: Option<&str>) -> Option<&str> {
    let url = url.filter(|u| !u.is_empty())?;
    Some(url.rsplit_once('/').map_or(url, |(_, name)| name))
}

fn normalize_set<I, S>(extensions: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
        .collect()
}

/// Keep generated names URL- and path-safe whatever extension was accepted.
fn sanitize_extension(extension: &str) -> String {
    extension
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn image_policy() -> AssetPolicy {
        AssetPolicies::default().get(AssetKind::ProfileImage).clone()
    }

    #[rstest]
    #[case("photo.JPG", "jpg")]
    #[case("archive.tar.gz", "gz")]
    #[case(".png", "png")]
    #[case("photo.", "")]
    #[case("photo", "")]
    fn test_extension_of(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(extension_of(filename), expected);
    }

    #[rstest]
    #[case("jpg", "image/jpeg")]
    #[case("jpeg", "image/jpeg")]
    #[case("png", "image/png")]
    #[case("gif", "image/gif")]
    #[case("bmp", "image/bmp")]
    #[case("webp", "application/octet-stream")]
    #[case("", "application/octet-stream")]
    fn test_content_type_table(#[case] ext: &str, #[case] expected: &str) {
        assert_eq!(content_type_for_extension(ext), expected);
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename(None), None);
        assert_eq!(extract_filename(Some("")), None);
        assert_eq!(
            extract_filename(Some("https://host/ns/abc.png")),
            Some("abc.png")
        );
        assert_eq!(extract_filename(Some("abc.png")), Some("abc.png"));
        assert_eq!(extract_filename(Some("https://host/ns/")), Some(""));
    }

    #[test]
    fn test_validation_order_empty_first() {
        let policy = image_policy();
        // Empty content wins over a missing filename.
        assert!(matches!(
            policy.validate(0, None),
            Err(AttachmentError::EmptyFile)
        ));
    }

    #[test]
    fn test_validation_order_size_before_filename() {
        let policy = image_policy();
        let err = policy.validate(3 * MIB, Some("   ")).unwrap_err();
        assert!(matches!(
            err,
            AttachmentError::FileTooLarge { size, max } if size == 3 * MIB && max == 2 * MIB
        ));
    }

    #[test]
    fn test_validation_order_filename_before_extension() {
        let policy = image_policy();
        assert!(matches!(
            policy.validate(10, Some(" ")),
            Err(AttachmentError::InvalidFilename)
        ));
        assert!(matches!(
            policy.validate(10, None),
            Err(AttachmentError::InvalidFilename)
        ));
    }

    #[rstest]
    #[case("photo")]
    #[case("photo.")]
    #[case("photo.webp")]
    #[case("report.pdf")]
    fn test_image_rejects_unlisted_extension(#[case] filename: &str) {
        let err = image_policy().validate(10, Some(filename)).unwrap_err();
        assert!(matches!(err, AttachmentError::UnsupportedType { .. }));
    }

    #[test]
    fn test_image_accepts_exact_limit_and_uppercase() {
        let ext = image_policy().validate(2 * MIB, Some("Cat.PNG")).unwrap();
        assert_eq!(ext, "png");
    }

    #[test]
    fn test_resource_policy_unrestricted_by_default() {
        let policy = AssetPolicies::default()
            .get(AssetKind::CourseResource)
            .clone();
        assert_eq!(policy.max_size_bytes(), None);
        assert_eq!(policy.validate(500 * MIB, Some("notes.docx")).unwrap(), "docx");
        assert_eq!(policy.validate(1, Some("README")).unwrap(), "");
    }

    #[test]
    fn test_resource_policy_hardened() {
        let mut config = StorageConfig::default();
        config.resources.allowed_extensions = Some(vec![".PDF".into()]);
        config.resources.max_size_bytes = Some(10 * MIB);
        let policies = AssetPolicies::from_config(&config);
        let policy = policies.get(AssetKind::CourseResource);

        assert_eq!(policy.validate(MIB, Some("syllabus.pdf")).unwrap(), "pdf");
        assert!(matches!(
            policy.validate(MIB, Some("syllabus.docx")),
            Err(AttachmentError::UnsupportedType { .. })
        ));
        assert!(matches!(
            policy.validate(11 * MIB, Some("syllabus.pdf")),
            Err(AttachmentError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_content_type_rules() {
        let image = image_policy();
        assert_eq!(image.content_type("png", Some("text/plain")), "image/png");

        let resource = AssetPolicy::resource("course-resources");
        assert_eq!(resource.content_type("pdf", None), "application/pdf");
        assert_eq!(resource.content_type("pdf", Some("  ")), "application/pdf");
        assert_eq!(
            resource.content_type("docx", Some("application/msword")),
            "application/msword"
        );
    }

    #[test]
    fn test_generate_name_format() {
        let policy = image_policy();
        let name = policy.generate_name("png");
        let (stem, ext) = name.rsplit_once('.').expect("has extension");
        assert_eq!(ext, "png");
        let id = stem.strip_prefix("profile_").expect("has prefix");
        let parsed = Uuid::parse_str(id).expect("uuid");
        assert_eq!(parsed.get_version_num(), 4);

        let bare = AssetPolicy::resource("r").generate_name("");
        assert!(bare.starts_with("resource_"));
        assert!(!bare.contains('.'));
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(
            AssetPolicies::default().namespaces(),
            ["profile-images", "course-images", "course-resources"]
        );
    }
}
