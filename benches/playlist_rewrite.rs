//! Benchmarks for playlist rewriting and template lookup
//!
//! Covers the per-request hot path: rewriting a fetched playlist and
//! matching the target host against the template list.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vidrelay::domains::{DomainTemplate, TemplateConfig, TemplateStore};
use vidrelay::hls::PlaylistRewriter;
use vidrelay::token::TokenCodec;

const BASE: &str = "https://cdn.example/show/season1/episode4/index.m3u8";

/// VOD media playlist with `segments` entries and an encryption key
fn media_playlist(segments: usize) -> String {
    let mut text = String::from(
        "#EXTM3U\n#EXT-X-VERSION:6\n#EXT-X-TARGETDURATION:6\n#EXT-X-MEDIA-SEQUENCE:0\n\
         #EXT-X-MAP:URI=\"init.mp4\"\n#EXT-X-KEY:METHOD=AES-128,URI=\"/keys/k1.bin\",IV=0x00000000000000000000000000000001\n",
    );
    for i in 0..segments {
        text.push_str("#EXTINF:6.006,\n");
        text.push_str(&format!("seg_{:05}.m4s\n", i));
    }
    text.push_str("#EXT-X-ENDLIST\n");
    text
}

/// Multivariant playlist with alternate audio and subtitle renditions
fn master_playlist() -> String {
    let mut text = String::from("#EXTM3U\n#EXT-X-INDEPENDENT-SEGMENTS\n");
    for lang in ["en", "ja", "es", "de"] {
        text.push_str(&format!(
            "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",LANGUAGE=\"{lang}\",NAME=\"{lang}\",URI=\"audio/{lang}/index.m3u8\"\n"
        ));
        text.push_str(&format!(
            "#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"sub\",LANGUAGE=\"{lang}\",NAME=\"{lang}\",URI=\"subs/{lang}.m3u8\"\n"
        ));
    }
    for (bw, res) in [(800_000, "640x360"), (2_400_000, "1280x720"), (6_000_000, "1920x1080")] {
        text.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={bw},RESOLUTION={res},CODECS=\"avc1.640028,mp4a.40.2\",AUDIO=\"aud\",SUBTITLES=\"sub\"\n{res}/index.m3u8\n"
        ));
    }
    text
}

fn template_store(count: usize) -> TemplateStore {
    let domain_templates = (0..count)
        .map(|i| DomainTemplate {
            patterns: vec![format!(r"(?i)^(www\.)?cdn{}\.example\.(com|net)$", i)],
            referer: Some(format!("https://player{}.example/", i)),
            ..DomainTemplate::default()
        })
        .collect();
    TemplateStore::new(TemplateConfig {
        domain_templates,
        ..TemplateConfig::default()
    })
}

fn bench_media_playlist(c: &mut Criterion) {
    let codec = TokenCodec::default();
    let mut group = c.benchmark_group("rewrite_media_playlist");

    for segments in [10, 100, 1000] {
        let playlist = media_playlist(segments);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &playlist, |b, p| {
            let rewriter = PlaylistRewriter::new(&codec, BASE, "");
            b.iter(|| rewriter.rewrite(black_box(p)).unwrap())
        });
    }

    group.finish();
}

fn bench_master_playlist(c: &mut Criterion) {
    let codec = TokenCodec::default();
    let playlist = master_playlist();
    let blob = r#"{"Cookie":"session=abcdef0123456789","X-Requested-With":"player"}"#;

    c.bench_function("rewrite_master_playlist", |b| {
        let rewriter = PlaylistRewriter::new(&codec, BASE, "");
        b.iter(|| rewriter.rewrite(black_box(&playlist)).unwrap())
    });

    c.bench_function("rewrite_master_playlist_with_blob", |b| {
        let rewriter = PlaylistRewriter::new(&codec, BASE, blob);
        b.iter(|| rewriter.rewrite(black_box(&playlist)).unwrap())
    });
}

fn bench_template_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_find_match");

    for count in [5, 50] {
        let store = template_store(count);
        let last = format!("https://cdn{}.example.net/v/seg.ts", count - 1);
        group.bench_with_input(BenchmarkId::new("last_template", count), &last, |b, url| {
            b.iter(|| store.find_match(black_box(url)))
        });
        group.bench_with_input(
            BenchmarkId::new("no_match", count),
            &"https://unknown.example.org/v/seg.ts",
            |b, url| b.iter(|| store.find_match(black_box(url))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_media_playlist,
    bench_master_playlist,
    bench_template_lookup
);
criterion_main!(benches);
