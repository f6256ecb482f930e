fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use matsync_protocol::{
        ConnectionType, PrinterRecord, UploadRequest, UploadSlotResponse, parse_upload_slot,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_slice(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_upload_request() {
        let parsed = roundtrip_test::<UploadRequest>("upload_request.json");
        assert_eq!(
            parsed,
            UploadRequest::new(48213, "cura.umm", "application/zip", "cura")
        );
    }

    #[test]
    fn fixture_upload_slot_response() {
        let parsed = roundtrip_test::<UploadSlotResponse>("upload_slot_response.json");
        assert!(parsed.upload_url.is_some());

        let slot = parse_upload_slot(&read_fixture("upload_slot_response.json")).unwrap();
        assert_eq!(slot.material_profile_id, "5f1e8a2c-4b7d-4c11-9e2a-0d6f3b1a9c77");
    }

    #[test]
    fn fixture_upload_slot_envelope_matches_flat_form() {
        let flat = parse_upload_slot(&read_fixture("upload_slot_response.json")).unwrap();
        let wrapped = parse_upload_slot(&read_fixture("upload_slot_envelope.json")).unwrap();
        assert_eq!(flat, wrapped);
    }

    #[test]
    fn fixture_printer_record() {
        let parsed = roundtrip_test::<PrinterRecord>("printer_record.json");
        assert_eq!(parsed.connection_type, ConnectionType::Cloud);
        assert!(parsed.is_online);
    }
}
