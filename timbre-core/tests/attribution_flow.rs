//! End-to-end flows: decoded PCM → voice profile, and diarization output →
//! aggregated speakers → transcript attribution → library identities.

use std::collections::HashMap;
use std::f32::consts::TAU;

use timbre_core::{
    aggregate_speaker_profiles, average_profiles, find_match, match_all_speakers, similarity,
    AnalyzerConfig, AudioChunk, DiarizationSegment, EnergyVad, KnownSpeaker, SpeakerTimeline,
    SpectralAnalyzer, VadDecision, VoiceActivityDetector, EMBEDDING_DIM, MATCH_THRESHOLD,
};

fn sine_chunk(freq: f32, amplitude: f32, secs: f32) -> AudioChunk {
    let rate = 16_000u32;
    let len = (secs * rate as f32) as usize;
    let samples = (0..len)
        .map(|i| amplitude * (TAU * freq * i as f32 / rate as f32).sin())
        .collect();
    AudioChunk::new(samples, rate)
}

fn embedding_for(seed: usize) -> Vec<f32> {
    // Deterministic, roughly unit-scale, distinct per seed.
    let mut v: Vec<f32> = (0..EMBEDDING_DIM)
        .map(|i| ((i * (seed + 3)) as f32 * 0.61).sin())
        .collect();
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    for x in &mut v {
        *x /= norm;
    }
    v
}

fn segment(tag: &str, start: f64, end: f64, seed: usize) -> DiarizationSegment {
    DiarizationSegment {
        speaker_tag: tag.into(),
        start_time: start,
        end_time: end,
        quality_score: 0.85,
        embedding: embedding_for(seed),
    }
}

#[test]
fn pcm_to_profile_to_enrollment() {
    let analyzer = SpectralAnalyzer::new(AnalyzerConfig::default()).expect("valid default config");

    // Two takes of the "same speaker" (same fundamental), one different voice.
    let take_one = analyzer
        .extract_profile(&sine_chunk(210.0, 0.5, 1.0))
        .expect("extract take one");
    let take_two = analyzer
        .extract_profile(&sine_chunk(215.0, 0.45, 1.0))
        .expect("extract take two");
    let other_voice = analyzer
        .extract_profile(&sine_chunk(440.0, 0.2, 1.0))
        .expect("extract other voice");

    assert!(!take_one.is_empty());
    assert!((take_one.pitch_mean - 210.0).abs() / 210.0 < 0.05);

    // Self-similarity is exact; same-voice beats different-voice.
    assert!((similarity(&take_one, &take_one) - 1.0).abs() < 1e-5);
    assert!(similarity(&take_one, &take_two) > similarity(&take_one, &other_voice));

    // Multi-sample enrollment stays close to both takes.
    let enrolled = average_profiles(&[take_one.clone(), take_two.clone()])
        .expect("non-empty enrollment input");
    assert!(similarity(&enrolled, &take_one) > 0.9);
    assert!(similarity(&enrolled, &take_two) > 0.9);
}

#[test]
fn vad_gates_a_recording_stream() {
    let mut vad = EnergyVad::default();
    let frame = |chunk: &AudioChunk, at: usize| -> AudioChunk {
        AudioChunk::new(chunk.samples[at..at + 512].to_vec(), chunk.sample_rate)
    };

    let speech = sine_chunk(180.0, 0.4, 0.5);
    let silence = AudioChunk::new(vec![0.0; 8_000], 16_000);

    // Leading silence stays silent.
    for i in 0..4 {
        assert_eq!(
            vad.classify(&frame(&silence, i * 512)),
            VadDecision::Silence
        );
    }
    // Sustained speech flips the detector after the debounce window.
    let mut decisions = Vec::new();
    for i in 0..8 {
        decisions.push(vad.classify(&frame(&speech, i * 512)));
    }
    assert_eq!(decisions[0], VadDecision::Silence);
    assert!(decisions[3..].iter().all(|d| d.is_speech()));

    // Fresh session: no state carries over.
    vad.reset();
    assert_eq!(vad.classify(&frame(&silence, 0)), VadDecision::Silence);
}

#[test]
fn diarization_to_library_attribution() {
    // One recording: spk_0 talks twice, spk_1 once, with a gap around t≈6.
    let segments = vec![
        segment("spk_0", 0.0, 2.0, 1),
        segment("spk_0", 3.0, 5.0, 1),
        segment("spk_1", 7.0, 10.0, 2),
    ];

    let profiles = aggregate_speaker_profiles(&segments, None);
    assert_eq!(profiles.len(), 2);
    assert!((profiles["spk_0"].total_duration - 4.0).abs() < 1e-9);
    assert!((profiles["spk_1"].total_duration - 3.0).abs() < 1e-9);

    // Transcript units resolve across the gap via carry-forward.
    let timeline = SpeakerTimeline::new(segments);
    let words = vec![
        ("w1".to_string(), 1.2),
        ("w2".to_string(), 6.2), // in the gap — carried forward from spk_0
        ("w3".to_string(), 8.0),
    ];
    let assigned = timeline.assign_speakers(&words);
    assert_eq!(assigned["w1"], "spk_0");
    assert_eq!(assigned["w2"], "spk_0");
    assert_eq!(assigned["w3"], "spk_1");

    // Library holds spk_1's voice under a persistent identity.
    let library = vec![
        KnownSpeaker {
            id: "speaker-ada".into(),
            embedding: embedding_for(2),
        },
        KnownSpeaker {
            id: "speaker-grace".into(),
            embedding: embedding_for(9),
        },
    ];

    let matched = match_all_speakers(&profiles, &library, MATCH_THRESHOLD);
    assert_eq!(matched.get("spk_1").map(String::as_str), Some("speaker-ada"));

    // spk_0 is a stranger: present in profiles, absent from the match map
    // unless its embedding happens to sit under the threshold.
    if let Some(id) = matched.get("spk_0") {
        let profile = &profiles["spk_0"];
        let hit = find_match(&profile.embedding, &library, MATCH_THRESHOLD).unwrap();
        assert_eq!(&hit.id, id);
    }
}

#[test]
fn degraded_inputs_never_abort_the_flow() {
    let analyzer = SpectralAnalyzer::new(AnalyzerConfig::default()).unwrap();

    // Too little audio → sentinel profile, similarity 0 against anything.
    let stub = analyzer
        .extract_profile(&AudioChunk::new(vec![0.2; 100], 16_000))
        .unwrap();
    assert!(stub.is_empty());
    let real = analyzer
        .extract_profile(&sine_chunk(200.0, 0.5, 0.5))
        .unwrap();
    assert_eq!(similarity(&stub, &real), 0.0);

    // A recording whose segments are all malformed aggregates to nothing,
    // and matching an empty profile map yields an empty result map.
    let broken = vec![
        segment("spk_0", 4.0, 4.0, 1),
        DiarizationSegment {
            speaker_tag: "spk_0".into(),
            start_time: 5.0,
            end_time: 6.0,
            quality_score: 0.1,
            embedding: vec![0.5; 64],
        },
    ];
    let profiles = aggregate_speaker_profiles(&broken, None);
    assert!(profiles.is_empty());
    let matched = match_all_speakers(&HashMap::new(), &[], MATCH_THRESHOLD);
    assert!(matched.is_empty());
}
