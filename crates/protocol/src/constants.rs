use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Root of the cloud API used when no override is configured.
pub const DEFAULT_API_ROOT: &str = "https://api.ultimaker.com";

/// Path of the "request upload slot" endpoint, relative to the API root.
pub const UPLOAD_REQUEST_PATH: &str = "/connect/v1/materials/upload";

/// File name announced for the archive.
///
/// The server ignores it apart from requiring the `.umm` extension.
pub const DEFAULT_FILE_NAME: &str = "cura.umm";

/// The upload endpoint only accepts zip payloads.
pub const DEFAULT_CONTENT_TYPE: &str = "application/zip";

/// Fixed client token sent with every upload request.
pub const DEFAULT_ORIGIN: &str = "cura";

/// Content type of API request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Characters escaped when an opaque identifier is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds the URL of the "request upload slot" endpoint.
pub fn upload_request_url(api_root: &str) -> String {
    format!("{}{UPLOAD_REQUEST_PATH}", api_root.trim_end_matches('/'))
}

/// Builds the per-printer confirmation URL.
pub fn confirm_upload_url(api_root: &str, cluster_id: &str, printer_id: &str) -> String {
    format!(
        "{}/connect/v1/clusters/{}/printers/{}/action/confirm_material_upload",
        api_root.trim_end_matches('/'),
        utf8_percent_encode(cluster_id, PATH_SEGMENT),
        utf8_percent_encode(printer_id, PATH_SEGMENT),
    )
}
