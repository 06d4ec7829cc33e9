use crate::prelude::*;
use crate::tests::{
    external_engine, glonass, gps, init_logger, internal_engine, irnss, snapshot, t0,
    ScriptedSource,
};

#[test]
fn detection_accumulates_while_index_follows_snapshot() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    let report = engine
        .ingest(&snapshot(
            1.0,
            vec![gps(7, 20.0), irnss(2, 25.0), glonass(12, 18.0)],
        ))
        .unwrap();
    assert_eq!(report.observed, 3);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.merged, 0);
    assert_eq!(
        report.systems,
        vec![GnssSystem::Gps, GnssSystem::Glonass, GnssSystem::Irnss]
    );

    // second cycle: GLONASS dropped out, GPS repeats
    let report = engine
        .ingest(&snapshot(2.0, vec![gps(7, 40.0), irnss(2, 25.0)]))
        .unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.merged, 2);

    // per-satellite detail accumulates
    assert_eq!(engine.total_satellites(), 3);
    let list = engine.all_satellites(t0());
    let gps_rec = list
        .satellites
        .iter()
        .find(|rec| rec.key.system == GnssSystem::Gps)
        .unwrap();
    assert_eq!(gps_rec.detection_count, 2);
    assert_eq!(gps_rec.cn0_dbhz, 30.0);

    // instantaneous membership only reflects the latest snapshot
    let details = engine.constellation_details(t0());
    assert!(!details.systems.contains_key(&GnssSystem::Glonass));
    assert_eq!(details.systems.len(), 2);

    session.stop(&engine);
}

#[test]
fn detection_restarts_empty_monitoring_preserves() {
    init_logger();

    let engine = internal_engine();

    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();
    engine
        .ingest(&snapshot(1.0, vec![gps(7, 20.0)]))
        .unwrap();
    assert_eq!(engine.total_satellites(), 1);
    session.stop(&engine);

    // monitoring keeps what detection accumulated
    let session = Session::monitoring(&engine, ScriptedSource::empty()).unwrap();
    assert_eq!(engine.total_satellites(), 1);
    session.stop(&engine);

    // a fresh detection session restarts from nothing
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();
    assert_eq!(engine.total_satellites(), 0);
    session.stop(&engine);
}

#[test]
fn no_merge_after_stop() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();
    session.stop(&engine);

    assert_eq!(
        engine.ingest(&snapshot(1.0, vec![gps(7, 20.0)])),
        Err(Error::SessionClosed)
    );
    assert_eq!(engine.total_satellites(), 0);
}

#[test]
fn source_conditions_surface_before_merge() {
    init_logger();

    let engine = internal_engine();
    let mut session = Session::detection(
        &engine,
        ScriptedSource::new([Err(Error::PermissionDenied)]),
    )
    .unwrap();

    assert_eq!(session.tick(&engine), Err(Error::PermissionDenied));
    assert_eq!(engine.total_satellites(), 0);
    session.stop(&engine);
}

#[test]
fn session_refuses_unavailable_receiver() {
    init_logger();

    let engine = Engine::new(
        Config::default(),
        Box::new(FixedReceiverMode::unavailable()),
    );
    let result = Session::detection(&engine, ScriptedSource::empty());
    assert!(matches!(result, Err(Error::ReceiverUnavailable)));
}

#[test]
fn navic_confirmation_floor() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    let report = engine
        .ingest(&snapshot(
            1.0,
            vec![
                irnss(2, 25.0).with_used_in_fix(true),
                // below the 15 dB-Hz floor: merged, not confirmed
                irnss(3, 14.9),
                // outside the NavIC svid range
                irnss(20, 30.0),
            ],
        ))
        .unwrap();

    assert_eq!(report.navic.confirmed, 1);
    assert_eq!(report.navic.used_in_fix, 1);
    assert_eq!(report.navic.with_signal, 1);
    assert_eq!(report.navic.average_cn0_dbhz, 25.0);

    // everything still landed in the table
    assert_eq!(engine.total_satellites(), 3);
    session.stop(&engine);
}

#[test]
fn confirmation_floor_is_configurable() {
    init_logger();

    let mut cfg = Config::default();
    cfg.navic_confirmation_cn0_dbhz = 10.0;
    let engine = Engine::new(cfg, Box::new(FixedReceiverMode::internal()));
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    let report = engine
        .ingest(&snapshot(1.0, vec![irnss(3, 14.9)]))
        .unwrap();
    assert_eq!(report.navic.confirmed, 1);
    session.stop(&engine);
}

#[test]
fn external_identity_and_enhanced_defaults() {
    init_logger();

    let engine = external_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(1.0, vec![irnss(2, 25.0), gps(7, 30.0)]))
        .unwrap();

    let list = engine.all_satellites(t0());
    for rec in &list.satellites {
        assert!(rec.key.external);
    }

    // no carrier in the feed: enhanced defaults apply
    let irnss_rec = list
        .satellites
        .iter()
        .find(|rec| rec.key.system == GnssSystem::Irnss)
        .unwrap();
    assert_eq!(irnss_rec.band, Band::L5S);
    let gps_rec = list
        .satellites
        .iter()
        .find(|rec| rec.key.system == GnssSystem::Gps)
        .unwrap();
    assert_eq!(gps_rec.band, Band::L1L5);

    session.stop(&engine);
}

#[test]
fn enhanced_band_latches_on_measured_l5_carrier() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();
    assert!(!engine.enhanced_band_active());

    engine
        .ingest(&snapshot(
            1.0,
            vec![gps(7, 30.0).with_carrier_frequency_hz(1176450000.0)],
        ))
        .unwrap();
    assert!(engine.enhanced_band_active());

    // stays latched through snapshots without the carrier
    engine
        .ingest(&snapshot(2.0, vec![gps(7, 30.0)]))
        .unwrap();
    assert!(engine.enhanced_band_active());

    session.stop(&engine);
}

#[test]
fn digest_published_per_ingest() {
    init_logger();

    let engine = internal_engine();
    let mut rx = engine.subscribe();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![gps(7, 30.0).with_used_in_fix(true), irnss(2, 25.0)],
        ))
        .unwrap();

    let digest = rx.try_recv().unwrap();
    assert_eq!(digest.total_satellites, 2);
    assert_eq!(
        digest.systems,
        vec![GnssSystem::Gps, GnssSystem::Irnss]
    );
    assert_eq!(digest.diversity.total_systems, 2);
    assert_eq!(digest.primary, PrimarySystem::Hybrid(GnssSystem::Gps));
    assert!(!digest.external);

    session.stop(&engine);
}

#[test]
fn in_range_filter() {
    init_logger();

    let engine = internal_engine();

    // nothing merged yet
    assert_eq!(
        engine.satellites_in_range(t0()).err(),
        Some(Error::NoDataYet)
    );
    assert!(engine.range_statistics(t0()).is_err());

    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();
    engine
        .ingest(&snapshot(1.0, vec![gps(7, 30.0), gps(8, 0.0)]))
        .unwrap();

    let in_range = engine.satellites_in_range(t0()).unwrap();
    assert_eq!(in_range.satellites.len(), 1);
    assert_eq!(in_range.satellites[0].key.svid, 7);

    let all = engine.all_satellites(t0());
    assert_eq!(all.satellites.len(), 2);
    // zero-signal records do not drag the average down
    assert_eq!(all.systems[&GnssSystem::Gps].average_signal, 30.0);

    session.stop(&engine);
}

#[test]
fn range_statistics_rollup() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![
                gps(1, 30.0).with_used_in_fix(true),
                gps(2, 20.0).with_used_in_fix(true),
                gps(3, 0.0),
                irnss(2, 40.0),
            ],
        ))
        .unwrap();

    let stats = engine.range_statistics(t0()).unwrap();
    assert_eq!(stats.total_satellites, 4);
    assert_eq!(stats.with_signal, 3);
    assert_eq!(stats.used_in_fix, 2);
    assert_eq!(stats.average_signal, 30.0);
    assert_eq!(stats.primary, PrimarySystem::Hybrid(GnssSystem::Gps));
    assert_eq!(stats.systems[&GnssSystem::Gps].count, 3);
    assert_eq!(stats.systems[&GnssSystem::Gps].has_signal, 2);

    session.stop(&engine);
}

#[test]
fn detailed_info_enrichment() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![gps(7, 30.0)
                .with_used_in_fix(true)
                .with_orbital_data(true, true)],
        ))
        .unwrap();

    let t = t0() + Duration::from_seconds(61.0);
    let info = engine.detailed_info(t).unwrap();
    assert_eq!(info.satellites.len(), 1);

    let detail = &info.satellites[0];
    assert_eq!(detail.name, "GPS PRN-07");
    assert_eq!(detail.constellation, "Global Positioning System (USA)");
    assert_eq!(detail.role, PositioningRole::PrimaryPositioning);
    assert_eq!(detail.health, HealthStatus::Excellent);
    assert_eq!(detail.age, Duration::from_seconds(60.0));

    session.stop(&engine);
}

#[test]
fn detection_history_bookkeeping() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(1.0, vec![gps(7, 30.0)]))
        .unwrap();
    engine
        .ingest(&snapshot(5.0, vec![gps(7, 20.0)]))
        .unwrap();

    let history = engine.detection_history(t0() + Duration::from_seconds(10.0));
    assert_eq!(history.entries.len(), 1);

    let entry = &history.entries[0];
    assert_eq!(entry.detection_count, 2);
    assert_eq!(entry.first_detection, t0() + Duration::from_seconds(1.0));
    assert_eq!(entry.last_detection, t0() + Duration::from_seconds(5.0));
    assert_eq!(entry.age, Duration::from_seconds(9.0));

    session.stop(&engine);
}

#[test]
fn ephemeris_almanac_rollup() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![
                gps(1, 30.0).with_orbital_data(true, true),
                gps(2, 30.0).with_orbital_data(true, false),
                gps(3, 30.0).with_orbital_data(false, false),
                gps(4, 30.0).with_orbital_data(false, false),
            ],
        ))
        .unwrap();

    let status = engine.ephemeris_almanac_status(t0());
    assert_eq!(status.total_satellites, 4);
    assert_eq!(status.with_ephemeris, 2);
    assert_eq!(status.with_almanac, 1);
    assert_eq!(status.ephemeris_percentage, 50.0);
    assert_eq!(status.almanac_percentage, 25.0);

    session.stop(&engine);
}

#[test]
fn summary_counts_l5_records() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![
                gps(1, 30.0).with_carrier_frequency_hz(1176450000.0),
                gps(2, 30.0).with_carrier_frequency_hz(1575420000.0),
                irnss(2, 25.0).with_carrier_frequency_hz(1176450000.0),
            ],
        ))
        .unwrap();

    let summary = engine.complete_summary(t0());
    assert_eq!(summary.total_satellites, 3);
    assert_eq!(summary.system_counts[&GnssSystem::Gps], 2);
    assert_eq!(summary.l5_by_system[&GnssSystem::Gps], 1);
    assert_eq!(summary.l5_by_system[&GnssSystem::Irnss], 1);
    assert_eq!(summary.total_l5, 2);

    let names = engine.satellite_names(t0());
    assert!(names.any_l5);
    assert_eq!(names.names.len(), 3);

    session.stop(&engine);
}

#[test]
fn signal_quality_scores() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![
                gps(1, 40.0),
                gps(2, 36.0),
                gps(3, 5.0),
                gps(4, 2.0),
                // silent: excluded from quality buckets
                gps(5, 0.0),
            ],
        ))
        .unwrap();

    let quality = engine.signal_quality(t0()).unwrap();
    assert_eq!(quality.with_signal, 4);
    assert_eq!(quality.distribution.excellent, 2);
    assert_eq!(quality.distribution.poor, 2);
    // (100 + 100 + 20 + 20) / 4
    assert_eq!(quality.quality_score, 60.0);

    // the raw histogram buckets silent records as POOR
    let analysis = engine.signal_analysis(t0());
    assert_eq!(analysis.distribution.poor, 3);
    assert_eq!(analysis.with_signal, 4);

    session.stop(&engine);
}

#[test]
fn primary_election_prefers_irnss_at_dedicated_count() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    let mut observations = Vec::new();
    for svid in 1..=4 {
        observations.push(irnss(svid, 30.0).with_used_in_fix(true));
    }
    for svid in 1..=6 {
        observations.push(gps(svid, 30.0).with_used_in_fix(true));
    }
    engine.ingest(&snapshot(1.0, observations)).unwrap();

    let primary = engine.primary_system();
    assert_eq!(primary, PrimarySystem::Dedicated(GnssSystem::Irnss));
    assert_eq!(primary.to_string(), "NAVIC");

    session.stop(&engine);
}

#[test]
fn concurrent_reads_and_merges() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    std::thread::scope(|scope| {
        // producer cadence
        scope.spawn(|| {
            for round in 0..100_u16 {
                engine
                    .ingest(&snapshot(
                        round as f64,
                        vec![gps(round % 10 + 1, 30.0), irnss(2, 25.0)],
                    ))
                    .unwrap();
            }
        });
        // reader on its own thread: live listings against a moving table
        scope.spawn(|| {
            for _ in 0..100 {
                let list = engine.all_satellites(t0());
                for rec in &list.satellites {
                    assert!(rec.cn0_dbhz >= 0.0);
                    assert!(rec.detection_count >= 1);
                }
                let _ = engine.signal_quality(t0());
                let _ = engine.diversity_report(t0());
            }
        });
    });

    assert_eq!(engine.total_satellites(), 11);
    session.stop(&engine);
}

#[test]
fn diversity_overview() {
    init_logger();

    let engine = internal_engine();
    let session = Session::detection(&engine, ScriptedSource::empty()).unwrap();

    engine
        .ingest(&snapshot(
            1.0,
            vec![gps(1, 30.0), irnss(2, 25.0), glonass(3, 20.0)],
        ))
        .unwrap();

    let overview = engine.diversity_report(t0());
    assert_eq!(overview.report.total_systems, 3);
    assert_eq!(overview.report.total_satellites, 3);
    assert!((overview.report.score - 300.0 / 7.0).abs() < 1E-9);
    assert_eq!(overview.report.level, DiversityLevel::Fair);

    session.stop(&engine);
}
