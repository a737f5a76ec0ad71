use wavefront_config::*;

fn ends_free_flags() -> Vec<[bool; 4]> {
    (0..16u8)
        .map(|bits| [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0])
        .collect()
}

fn form_with(span: AlignmentSpan, flags: [bool; 4]) -> AlignmentForm {
    AlignmentForm {
        span,
        pattern_begin_free: flags[0],
        pattern_end_free: flags[1],
        text_begin_free: flags[2],
        text_end_free: flags[3],
        max_alignment_score: None,
    }
}

#[test]
fn test_span_and_free_gaps() {
    for span in [AlignmentSpan::EndToEnd, AlignmentSpan::EndsFree] {
        for flags in ends_free_flags() {
            let result = AlignerConfiguration::new().with_form(form_with(span, flags)).build();
            let expected_ok = span == AlignmentSpan::EndsFree || flags.iter().all(|f| !f);
            assert_eq!(result.is_ok(), expected_ok, "span={:?} flags={:?}", span, flags);
            if let Err(e) = result {
                assert!(matches!(e, WavefrontError::InvalidForm(_)));
            }
        }
    }
}

#[test]
fn test_negative_penalties_rejected() {
    let models = [
        DistanceModel::Linear(LinearPenalties { mismatch: -1, indel: 2 }),
        DistanceModel::Linear(LinearPenalties { mismatch: 4, indel: -2 }),
        DistanceModel::Affine(AffinePenalties { mismatch: -4, gap_opening: 6, gap_extension: 2 }),
        DistanceModel::Affine(AffinePenalties { mismatch: 4, gap_opening: -6, gap_extension: 2 }),
        DistanceModel::Affine(AffinePenalties { mismatch: 4, gap_opening: 6, gap_extension: -2 }),
        DistanceModel::Affine2p(Affine2pPenalties { gap_opening2: -24, ..Default::default() }),
        DistanceModel::Affine2p(Affine2pPenalties { gap_extension1: -1, ..Default::default() }),
        DistanceModel::Affine2p(Affine2pPenalties { mismatch: i32::MIN, ..Default::default() }),
    ];
    for model in models {
        let result = AlignerConfiguration::new().with_distance_model(model).build();
        assert!(
            matches!(result, Err(WavefrontError::InvalidPenalty { .. })),
            "{:?}",
            model
        );
    }
}

#[test]
fn test_resident_above_used_rejected() {
    for (resident, used) in [(1000, 500), (2, 1), (u64::MAX, 0)] {
        let mut config = AlignerConfiguration::new();
        config.system.max_memory_resident = Some(resident);
        config.system.max_memory_used = Some(used);
        assert!(matches!(config.build(), Err(WavefrontError::InvalidLimit(_))));
    }
}

#[test]
fn test_default_builds_immediately() {
    let config = AlignerConfiguration::default();
    assert!(config.build().is_ok());
    for metric in [
        DistanceMetric::Indel,
        DistanceMetric::Edit,
        DistanceMetric::Linear,
        DistanceMetric::Affine,
        DistanceMetric::Affine2p,
    ] {
        let mut config = AlignerConfiguration::default();
        config.set_distance_metric(metric);
        let validated = config.build().unwrap();
        assert_eq!(validated.distance_metric(), metric);
        assert!(validated.warnings().is_empty());
    }
}

#[test]
fn test_default_copies_are_independent() {
    let mut first = AlignerConfiguration::default();
    let mut second = AlignerConfiguration::default();

    first.set_distance_metric(DistanceMetric::Edit);
    first.alignment_form.set_span(AlignmentSpan::EndsFree);
    first.alignment_form.set_free_gap(Boundary::TextEnd, true).unwrap();
    second.alignment_scope = AlignmentScope::ScoreOnly;
    second.system.set_global_probe_interval(1).unwrap();

    let first = first.build().unwrap();
    let second = second.build().unwrap();
    assert_eq!(first.distance_metric(), DistanceMetric::Edit);
    assert!(first.alignment_form().is_free(Boundary::TextEnd));
    assert_eq!(first.alignment_scope(), AlignmentScope::FullAlignment);
    assert_eq!(second.distance_metric(), DistanceMetric::Affine);
    assert_eq!(second.alignment_form().span, AlignmentSpan::EndToEnd);
    assert_eq!(second.system().global_probe_interval, 1);

    assert_eq!(AlignerConfiguration::default(), AlignerConfiguration::new());
    assert_eq!(AlignerConfiguration::default().system.global_probe_interval, 3000);
}

#[test]
fn test_build_is_idempotent() {
    let config = AlignerConfiguration::new()
        .with_reduction(ReductionStrategy::adaptive())
        .with_low_memory(true);
    let once = config.build().unwrap();
    let twice = config.build().unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.as_configuration().build().unwrap(), once);
}

#[test]
fn test_scenario_a_affine_end_to_end() {
    let config = AlignerConfiguration::new()
        .with_distance_model(DistanceModel::Affine(AffinePenalties {
            mismatch: 4,
            gap_opening: 6,
            gap_extension: 2,
        }))
        .with_form(AlignmentForm::end_to_end())
        .build()
        .unwrap();
    let penalties = config.distance_model().affine().unwrap();
    assert_eq!(penalties.gap_opening, 6);
    assert_eq!(penalties.gap_extension, 2);
}

#[test]
fn test_scenario_b_free_pattern_begin_on_end_to_end() {
    let mut config = AlignerConfiguration::new();
    config.alignment_form.pattern_begin_free = true;
    assert!(matches!(config.build(), Err(WavefrontError::InvalidForm(_))));
}

#[test]
fn test_scenario_c_zero_probe_interval() {
    let mut config = AlignerConfiguration::new();
    config.system.global_probe_interval = 0;
    assert!(matches!(config.build(), Err(WavefrontError::InvalidLimit(_))));
}

#[test]
fn test_scenario_d_resident_exceeds_used() {
    let mut config = AlignerConfiguration::new();
    config.system.max_memory_resident = Some(1000);
    config.system.max_memory_used = Some(500);
    assert!(matches!(config.build(), Err(WavefrontError::InvalidLimit(_))));
}

#[test]
fn test_scenario_e_score_only_with_compaction_limits() {
    let mut config = AlignerConfiguration::new().with_scope(AlignmentScope::ScoreOnly);
    config.system.set_bt_compact_probe_interval(17).unwrap();
    config.system.set_bt_compact_max_memory(12_345);
    let validated = config.build().unwrap();
    assert!(!validated.requires_backtrace());
    assert_eq!(validated.system().bt_compact_probe_interval, 17);
}

#[test]
fn test_degenerate_affine2p_builds_with_warning() {
    let config = AlignerConfiguration::new()
        .with_distance_model(DistanceModel::Affine2p(Affine2pPenalties {
            mismatch: 4,
            gap_opening1: 6,
            gap_extension1: 2,
            gap_opening2: 6,
            gap_extension2: 2,
        }))
        .build()
        .unwrap();
    assert_eq!(config.warnings(), &[ConfigWarning::DegenerateAffine2p]);
}

/// Unit-cost edit distance that walks scores one step at a time, probing
/// the monitor and notifying the observer like a wavefront engine would.
struct StepEngine {
    bytes_per_step: u64,
}

impl AlignmentEngine for StepEngine {
    type Output = i32;

    fn align(
        &mut self,
        config: &ValidatedConfiguration<'_>,
        pattern: &[u8],
        text: &[u8],
    ) -> Result<i32, WavefrontError> {
        let distance = edit_distance(pattern, text);
        let run_arena = config.run_arena();
        let arena = run_arena.arena();
        let mut monitor = config.monitor(arena);
        let mut backtrace = 0;

        for score in 0..=distance {
            arena.reserve(self.bytes_per_step);
            if config.requires_backtrace() {
                backtrace += self.bytes_per_step;
            }
            let usage = MemoryUsage::from_arena(arena, backtrace);
            if let Some(observer) = config.observer() {
                observer.on_step(&Checkpoint {
                    score,
                    lo: -score,
                    hi: score,
                    pattern_pos: score as u32,
                    text_pos: score as u32,
                    memory_used: usage.used,
                });
            }
            let outcome = match monitor.probe(score, usage) {
                Ok(outcome) => outcome,
                Err(e) => {
                    if let Some(observer) = config.observer() {
                        observer.on_finish(None);
                    }
                    return Err(e);
                }
            };
            if outcome.reap {
                arena.reap();
            }
            if outcome.compact {
                backtrace /= 2;
            }
        }
        if let Some(observer) = config.observer() {
            observer.on_finish(Some(distance));
        }
        Ok(distance)
    }
}

fn edit_distance(a: &[u8], b: &[u8]) -> i32 {
    let mut row: Vec<i32> = (0..=b.len() as i32).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i as i32 + 1;
        for (j, &cb) in b.iter().enumerate() {
            let next = (diag + i32::from(ca != cb)).min(row[j] + 1).min(row[j + 1] + 1);
            diag = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

#[test]
fn test_engine_completes_with_default_limits() {
    let config = AlignerConfiguration::new()
        .with_distance_model(DistanceModel::Edit)
        .build()
        .unwrap();
    let mut engine = StepEngine { bytes_per_step: 64 };
    assert_eq!(engine.align(&config, b"GATTACA", b"GCATGCU"), Ok(4));
}

#[test]
fn test_engine_aborts_on_score_ceiling() {
    let config = AlignerConfiguration::new()
        .with_max_score(Some(2))
        .unwrap()
        .build()
        .unwrap();
    let mut engine = StepEngine { bytes_per_step: 64 };
    assert_eq!(
        engine.align(&config, b"AAAAAA", b"CCCCCC"),
        Err(WavefrontError::AbortedScore { score: 3, limit: 2 })
    );
}

#[test]
fn test_engine_aborts_on_memory_ceiling() {
    let mut system = SystemLimits::default();
    system.set_global_probe_interval(1).unwrap();
    system.set_memory_limits(Some(100), Some(200)).unwrap();
    let config = AlignerConfiguration::new().with_system(system).build().unwrap();
    let mut engine = StepEngine { bytes_per_step: 150 };
    let err = engine.align(&config, b"ACGT", b"TGCA").unwrap_err();
    assert_eq!(err, WavefrontError::AbortedMemory { used: 300, limit: 200 });
    assert!(err.is_abort());
}

#[test]
fn test_engine_uses_external_arena_and_observer() {
    let arena = ScratchArena::new(16);
    let recorder = PlotRecorder::new(PlotParams {
        enabled: true,
        ..Default::default()
    });
    let config = AlignerConfiguration::new()
        .with_allocator(&arena)
        .with_observer(&recorder)
        .build()
        .unwrap();
    assert!(config.allocator().is_some());

    let mut engine = StepEngine { bytes_per_step: 10 };
    assert_eq!(engine.align(&config, b"kitten", b"sitting"), Ok(3));
    assert_eq!(arena.bytes_used(), 40);
    assert_eq!(recorder.points().len(), 4);
    assert_eq!(recorder.final_score(), Some(3));
}

#[test]
fn test_internal_arena_is_per_run() {
    let config = AlignerConfiguration::new().build().unwrap();
    let first = config.run_arena();
    first.arena().reserve(1024);
    let second = config.run_arena();
    assert!(second.is_internal());
    assert_eq!(second.arena().bytes_used(), 0);
}

#[test]
fn test_effective_compaction_recomputed_per_run() {
    let mut config = AlignerConfiguration::new();
    config.system.set_bt_compact_max_memory(1000);
    let validated = config.build().unwrap();
    assert_eq!(RunMonitor::new(&validated, 100).bt_compact_max_memory_eff(), 900);

    let mut config = validated.into_configuration();
    config.system.set_bt_compact_max_memory(5000);
    let validated = config.build().unwrap();
    assert_eq!(RunMonitor::new(&validated, 100).bt_compact_max_memory_eff(), 4900);
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_configurations_are_send_and_sync() {
    assert_send_sync::<AlignerConfiguration<'_>>();
    assert_send_sync::<ValidatedConfiguration<'_>>();
    assert_send_sync::<RunArena<'_>>();
}

#[test]
fn test_shared_arena_across_worker_threads() {
    let arena = ScratchArena::new(16);
    let recorder = PlotRecorder::new(PlotParams {
        enabled: true,
        ..Default::default()
    });
    let config = AlignerConfiguration::new()
        .with_allocator(&arena)
        .with_observer(&recorder)
        .build()
        .unwrap();

    let results: Vec<_> = std::thread::scope(|s| {
        let workers: Vec<_> = [(&b"kitten"[..], &b"sitting"[..]), (&b"GATTACA"[..], &b"GCATGCU"[..])]
            .into_iter()
            .map(|(pattern, text)| {
                let config = &config;
                s.spawn(move || StepEngine { bytes_per_step: 10 }.align(config, pattern, text))
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(results, vec![Ok(3), Ok(4)]);
    // 4 steps for kitten/sitting, 5 for GATTACA/GCATGCU
    assert_eq!(arena.bytes_used(), 90);
    assert_eq!(recorder.points().len(), 9);
}
