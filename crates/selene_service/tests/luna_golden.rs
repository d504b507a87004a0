//! End-to-end requests against DE421 (skipped when kernel is absent).

use std::path::PathBuf;

use selene_core::EngineConfig;
use selene_service::{LunaService, format_dec, format_ra_hours};
use selene_search::ApparentPositionSource;

fn load_service() -> Option<LunaService> {
    let spk = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../kernels/data/de421.bsp");
    if !spk.exists() {
        eprintln!("Skipping: kernel not found at {}", spk.display());
        return None;
    }
    Some(LunaService::start(EngineConfig::new(spk)).expect("should start service"))
}

#[test]
fn new_year_2024_scenario() {
    let Some(service) = load_service() else { return };
    let reply = service.handle_json(r#"{"fecha":"2024-01-01T00:00","tolerancia":10,"sexo":"F"}"#);
    assert!(reply.is_ok(), "{}", reply.to_json());

    let body: serde_json::Value = serde_json::from_str(&reply.to_json()).unwrap();
    let orbit = &body["orbitas"][0];
    assert_eq!(orbit["fecha"], "2024-01-01");
    let sol = orbit["sol_equivalente"].as_str().unwrap();
    assert!(sol.starts_with("2024-"), "{sol}");

    // Cycle 0 reports the Moon at the reference minute itself.
    let reference = selene_service::parse_reference_instant("2024-01-01T00:00").unwrap();
    let moon = service
        .source()
        .apparent_position(selene_core::Body::Moon, &reference)
        .unwrap();
    assert_eq!(
        orbit["luna"]["ascension_recta"],
        format_ra_hours(moon.ra_deg)
    );
    assert_eq!(orbit["luna"]["declinacion"], format_dec(moon.dec_deg));
}

#[test]
fn zero_tolerance_scenario_is_empty() {
    let Some(service) = load_service() else { return };
    let reply = service.handle_json(r#"{"fecha":"2024-01-01","tolerancia":0}"#);
    assert_eq!(reply.to_json(), r#"{"orbitas":[]}"#);
}

#[test]
fn out_of_coverage_date_fails_per_request() {
    let Some(service) = load_service() else { return };
    let reply = service.handle_json(r#"{"fecha":"2100-01-01"}"#);
    assert_eq!(reply.status(), 500);
    // The service keeps answering afterwards.
    assert!(service.handle_json(r#"{"fecha":"2010-05-05"}"#).is_ok());
}
