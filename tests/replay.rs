use vmtrace::engine::{AccessOutcome, TranslationEngine};
use vmtrace::io::{read_trace, write_report};
use vmtrace::memory::PagingStore;
use vmtrace::STORE_SIZE;

#[test]
fn replays_a_trace_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    let store_path = dir.path().join("BACKING_STORE.bin");
    let image: Vec<u8> = (0..STORE_SIZE).map(|i| (i % 251) as u8).collect();
    std::fs::write(&store_path, &image).unwrap();

    let trace_path = dir.path().join("addresses.txt");
    std::fs::write(&trace_path, "0 R\n0 W\n768 R\n968 R\n").unwrap();

    let trace = read_trace(&trace_path).unwrap();
    let mut engine = TranslationEngine::new(PagingStore::open(&store_path).unwrap());
    let results: Vec<_> = trace
        .iter()
        .map(|e| engine.translate(e.address, e.kind).unwrap())
        .collect();

    // Page 0 faults once and then hits; page 3 faults into the next frame.
    assert_eq!(results[0].outcome, AccessOutcome::Fault { wrote_back: false });
    assert_eq!(results[1].outcome, AccessOutcome::TlbHit);
    assert_eq!(results[2].outcome, AccessOutcome::Fault { wrote_back: false });
    assert_eq!(results[2].physical_address, 256);
    assert_eq!(results[3].outcome, AccessOutcome::TlbHit);
    assert_eq!(results[3].physical_address, 456);

    let report_path = dir.path().join("results.txt");
    write_report(&report_path, &results).unwrap();
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.starts_with("Virtual address: 0 Physical address: 0 Value: 0\n"));
    assert_eq!(report.lines().count(), 4);

    let stats = engine.stats();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.page_faults, 2);
    assert_eq!(stats.tlb_hits, 2);
    assert_eq!(stats.table_hits, 0);
}
