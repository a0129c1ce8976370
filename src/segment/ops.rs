use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::{
    error::{Result, SegmentError},
    segment::strategy::{run_chain, run_tool, SegmentOutcome, Strategy},
    video::{check_ffmpeg_available, probe_has_audio, Workspace},
};

/// Parse a time given as plain seconds (`12.5`) or a colon timecode
/// (`HH:MM:SS[.f]`, hours optional)
pub fn parse_timecode(value: &str) -> Result<f64> {
    if !value.contains(':') {
        return value
            .parse::<f64>()
            .ok()
            .filter(|s| *s >= 0.0)
            .ok_or_else(|| bad_timecode(value));
    }

    let parts: Vec<&str> = value.split(':').collect();
    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (h.parse::<f64>(), m.parse::<f64>(), s.parse::<f64>()),
        [m, s] => (Ok(0.0), m.parse::<f64>(), s.parse::<f64>()),
        _ => return Err(bad_timecode(value)),
    };

    match (h, m, s) {
        (Ok(h), Ok(m), Ok(s)) if h >= 0.0 && m >= 0.0 && s >= 0.0 => {
            Ok(h * 3600.0 + m * 60.0 + s)
        }
        _ => Err(bad_timecode(value)),
    }
}

fn bad_timecode(value: &str) -> crate::error::CompositorError {
    SegmentError::BadTimecode {
        value: value.to_string(),
    }
    .into()
}

/// Slice `[start, end]` out of `input` into `output`.
///
/// Runs the strategy chain: stream-copy trim, filter-based trim, full
/// re-encode, precise re-encode. First success wins; exhaustion is reported
/// through the outcome, not as an error.
pub async fn slice<P: AsRef<Path>>(
    input: P,
    output: P,
    start: &str,
    end: &str,
) -> Result<SegmentOutcome> {
    let input = input.as_ref();
    let output = output.as_ref();
    ensure_exists(input)?;

    let start_s = parse_timecode(start)?;
    let end_s = parse_timecode(end)?;
    if end_s <= start_s {
        return Err(SegmentError::InvalidRange {
            details: format!("{} .. {}", start, end),
        }
        .into());
    }
    ensure_tool()?;

    let has_audio = probe_has_audio(input);
    info!(
        "Slicing {} [{} .. {}] (audio: {})",
        input.display(),
        start,
        end,
        has_audio
    );

    let strategies = slice_strategies(
        &input.display().to_string(),
        &output.display().to_string(),
        start,
        end,
        start_s,
        end_s,
        has_audio,
    );
    Ok(run_chain(strategies).await)
}

fn slice_strategies(
    input: &str,
    output: &str,
    start: &str,
    end: &str,
    start_s: f64,
    end_s: f64,
    has_audio: bool,
) -> Vec<Strategy> {
    let mut strategies = Vec::new();

    // 1. Remux the range without touching codec data
    let mut copy_args = str_args(&["-y", "-ss", start, "-to", end, "-i", input, "-map", "0", "-c:v", "copy"]);
    if has_audio {
        copy_args.extend(str_args(&["-c:a", "copy"]));
    }
    copy_args.push(output.to_string());
    strategies.push(Strategy::new("stream_copy_trim", copy_args));

    // 2. Frame-accurate trim through the filter graph
    let filtergraph = if has_audio {
        format!(
            "[0:v]trim=start={s}:end={e},setpts=PTS-STARTPTS[v];[0:a]atrim=start={s}:end={e},asetpts=PTS-STARTPTS[a]",
            s = start_s,
            e = end_s
        )
    } else {
        format!(
            "[0:v]trim=start={s}:end={e},setpts=PTS-STARTPTS[v]",
            s = start_s,
            e = end_s
        )
    };
    let mut filter_args = str_args(&["-y", "-i", input, "-filter_complex"]);
    filter_args.push(filtergraph);
    filter_args.extend(str_args(&["-map", "[v]"]));
    if has_audio {
        filter_args.extend(str_args(&["-map", "[a]"]));
    }
    filter_args.push(output.to_string());
    strategies.push(Strategy::new("filter_trim", filter_args));

    // 3. Full re-encode, the most compatible fallback
    let mut reencode_args = str_args(&[
        "-y", "-ss", start, "-i", input, "-to", end, "-map", "0", "-c:v", "libx264", "-c:a",
        "aac", "-strict", "experimental", "-b:a", "192k",
    ]);
    reencode_args.push(output.to_string());
    strategies.push(Strategy::new("reencode_trim", reencode_args));

    // 4. Re-encode with an explicit duration and optional-audio mapping
    let duration = end_s - start_s;
    let mut precise_args = str_args(&["-y", "-i", input, "-ss", start, "-t"]);
    precise_args.push(duration.to_string());
    precise_args.extend(str_args(&[
        "-map", "0:v:0", "-map", "0:a?", "-c:v", "libx264", "-c:a", "aac", "-b:a", "192k",
    ]));
    precise_args.push(output.to_string());
    strategies.push(Strategy::new("reencode_precise", precise_args));

    strategies
}

/// Remove `[from, to]` from `input` and concatenate the remainder into
/// `output`. Head and tail are stream-copied; the rejoin falls back from a
/// stream-copy concat to a re-encoding concat.
pub async fn cut<P: AsRef<Path>>(
    input: P,
    output: P,
    from: &str,
    to: &str,
) -> Result<SegmentOutcome> {
    let input = input.as_ref();
    let output = output.as_ref();
    ensure_exists(input)?;

    let from_s = parse_timecode(from)?;
    let to_s = parse_timecode(to)?;
    if to_s <= from_s {
        return Err(SegmentError::InvalidRange {
            details: format!("{} .. {}", from, to),
        }
        .into());
    }
    ensure_tool()?;

    let mut workspace = Workspace::create()?;
    let first = workspace.scratch_path("first_part.mp4");
    let second = workspace.scratch_path("second_part.mp4");
    let input_str = input.display().to_string();

    info!(
        "Removing [{} .. {}] from {}",
        from,
        to,
        input.display()
    );

    // Head: everything before the removed range
    let head_args = str_args(&["-y", "-to", from, "-i", input_str.as_str(), "-c", "copy"])
        .into_iter()
        .chain([first.display().to_string()])
        .collect();
    if let Err(diag) = run_tool(head_args).await {
        warn!("Head extraction failed");
        return Ok(SegmentOutcome::failure(vec![format!("extract_head: {}", diag)]));
    }

    // Tail: everything after it
    let tail_args = str_args(&["-y", "-ss", to, "-i", input_str.as_str(), "-c", "copy"])
        .into_iter()
        .chain([second.display().to_string()])
        .collect();
    if let Err(diag) = run_tool(tail_args).await {
        warn!("Tail extraction failed");
        return Ok(SegmentOutcome::failure(vec![format!("extract_tail: {}", diag)]));
    }

    let list_path = workspace.scratch_path("concat_list.txt");
    write_concat_list(&list_path, &[&first, &second])?;

    let outcome = run_chain(concat_strategies(&list_path, output)).await;
    workspace.cleanup();
    Ok(outcome)
}

/// Insert `clip` into `main` at time `at`.
///
/// Both halves of the main video and the inserted clip are re-encoded with
/// a pinned frame rate and GOP so the concat demuxer can join them, then
/// rejoined with the usual copy-then-reencode concat fallback.
pub async fn insert<P: AsRef<Path>>(
    main: P,
    clip: P,
    output: P,
    at: &str,
) -> Result<SegmentOutcome> {
    let main = main.as_ref();
    let clip = clip.as_ref();
    let output = output.as_ref();
    ensure_exists(main)?;
    ensure_exists(clip)?;
    parse_timecode(at)?;
    ensure_tool()?;

    let mut workspace = Workspace::create()?;
    let first = workspace.scratch_path("first_part.mp4");
    let second = workspace.scratch_path("second_part.mp4");
    let reencoded_clip = workspace.scratch_path("reencoded_insert.mp4");
    let main_str = main.display().to_string();
    let clip_str = clip.display().to_string();

    info!(
        "Inserting {} into {} at {}",
        clip.display(),
        main.display(),
        at
    );

    let compat = ["-c:v", "libx264", "-c:a", "aac", "-r", "30", "-g", "30"];

    let first_args = str_args(&["-y", "-i", main_str.as_str(), "-to", at])
        .into_iter()
        .chain(str_args(&compat))
        .chain([first.display().to_string()])
        .collect();
    if let Err(diag) = run_tool(first_args).await {
        return Ok(SegmentOutcome::failure(vec![format!("split_head: {}", diag)]));
    }

    let second_args = str_args(&["-y", "-ss", at, "-i", main_str.as_str()])
        .into_iter()
        .chain(str_args(&compat))
        .chain([second.display().to_string()])
        .collect();
    if let Err(diag) = run_tool(second_args).await {
        return Ok(SegmentOutcome::failure(vec![format!("split_tail: {}", diag)]));
    }

    let clip_args = str_args(&["-y", "-i", clip_str.as_str(), "-b:a", "192k"])
        .into_iter()
        .chain(str_args(&compat))
        .chain([reencoded_clip.display().to_string()])
        .collect();
    if let Err(diag) = run_tool(clip_args).await {
        return Ok(SegmentOutcome::failure(vec![format!(
            "reencode_insert: {}",
            diag
        )]));
    }

    let list_path = workspace.scratch_path("concat_list.txt");
    write_concat_list(&list_path, &[&first, &reencoded_clip, &second])?;

    let outcome = run_chain(concat_strategies(&list_path, output)).await;
    workspace.cleanup();
    Ok(outcome)
}

fn concat_strategies(list_path: &Path, output: &Path) -> Vec<Strategy> {
    let list = list_path.display().to_string();
    let out = output.display().to_string();

    let copy_args = str_args(&["-y", "-f", "concat", "-safe", "0", "-i", list.as_str(), "-c", "copy"])
        .into_iter()
        .chain([out.clone()])
        .collect();

    let reencode_args = str_args(&[
        "-y", "-f", "concat", "-safe", "0", "-i", list.as_str(), "-c:v", "libx264", "-c:a", "aac",
        "-b:a", "192k",
    ])
    .into_iter()
    .chain([out])
    .collect();

    vec![
        Strategy::new("concat_copy", copy_args),
        Strategy::new("concat_reencode", reencode_args),
    ]
}

fn write_concat_list(list_path: &Path, parts: &[&std::path::PathBuf]) -> Result<()> {
    let mut file = File::create(list_path)?;
    for part in parts {
        let absolute = part.canonicalize().unwrap_or_else(|_| (*part).clone());
        writeln!(file, "file '{}'", absolute.display())?;
    }
    Ok(())
}

fn ensure_exists(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(SegmentError::InputMissing {
            path: input.display().to_string(),
        }
        .into());
    }
    Ok(())
}

fn ensure_tool() -> Result<()> {
    if !check_ffmpeg_available() {
        return Err(SegmentError::ToolMissing.into());
    }
    Ok(())
}

fn str_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
