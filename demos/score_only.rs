use wavefront_config::{
    AlignerConfiguration, AlignmentForm, AlignmentScope, Checkpoint, MemoryArena, MemoryUsage,
    PlotParams, PlotRecorder, ScratchArena, WavefrontObserver,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let arena = ScratchArena::default();
    let recorder = PlotRecorder::new(PlotParams {
        enabled: true,
        resolution_points: 16,
        ..Default::default()
    });

    // Semiglobal, score only, stop past score 40
    let config = AlignerConfiguration::new()
        .with_scope(AlignmentScope::ScoreOnly)
        .with_form(AlignmentForm::ends_free(false, false, true, true))
        .with_max_score(Some(40))?
        .with_allocator(&arena)
        .with_observer(&recorder)
        .with_verbose(true)
        .build()?;

    println!("{}", config.summary());

    // Stand-in for an engine loop: one probe per score step
    let run_arena = config.run_arena();
    let mut monitor = config.monitor(run_arena.arena());
    let mut score = 0;
    let result = loop {
        run_arena.arena().reserve(4096);
        let usage = MemoryUsage::from_arena(run_arena.arena(), 0);
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
        if let Err(e) = monitor.probe(score, usage) {
            break e;
        }
        score += 2;
    };
    recorder.on_finish(None);

    println!("Run stopped: {}", result);
    println!("Recorded {} plot points", recorder.points().len());
    println!("Arena holds {} bytes", arena.bytes_used());

    Ok(())
}
