//! Dispatch benchmarks — the hot path.
//!
//! Measures: context parsing, indexed hits through each candidate group,
//! miss-heavy workloads, and trace overhead.

use embedo::prelude::*;

fn main() {
    divan::main();
}

#[divan::bench]
fn context_parse(bencher: divan::Bencher) {
    bencher.bench_local(|| MatchContext::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
}

#[divan::bench]
fn exact_host_hit(bencher: divan::Bencher) {
    let registry = MatcherRegistry::with_defaults();
    bencher.bench_local(|| registry.match_url("https://youtu.be/dQw4w9WgXcQ"));
}

#[divan::bench]
fn base_domain_hit(bencher: divan::Bencher) {
    let registry = MatcherRegistry::with_defaults();
    bencher.bench_local(|| registry.match_url("https://player.vimeo.com/video/76979871"));
}

#[divan::bench]
fn scheme_hit(bencher: divan::Bencher) {
    let registry = MatcherRegistry::with_defaults();
    bencher.bench_local(|| registry.match_url("spotify:track:4cOdK2wGLETKBW3PvgPWqT"));
}

#[divan::bench]
fn miss(bencher: divan::Bencher) {
    let registry = MatcherRegistry::with_defaults();
    bencher.bench_local(|| registry.match_url("https://example.com/nothing/here"));
}

#[divan::bench]
fn trace_overhead(bencher: divan::Bencher) {
    let registry = MatcherRegistry::with_defaults();
    bencher.bench_local(|| registry.match_url_with_trace("https://youtu.be/dQw4w9WgXcQ"));
}

#[divan::bench]
fn embed_url_end_to_end(bencher: divan::Bencher) {
    let registry = MatcherRegistry::with_defaults();
    let options = EmbedOptions::new();
    bencher.bench_local(|| registry.embed_url("https://youtu.be/dQw4w9WgXcQ", &options));
}
