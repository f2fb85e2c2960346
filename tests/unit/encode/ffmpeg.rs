use super::*;
use std::sync::{Arc, Mutex};

use crate::foundation::core::{FrameBound, FrameIndex};

fn strs(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[test]
fn mp4_suffix_is_appended_when_missing() {
    assert_eq!(normalize_video_path(Path::new("out/video.mp4")), PathBuf::from("out/video.mp4"));
    assert_eq!(normalize_video_path(Path::new("out/video")), PathBuf::from("out/video.mp4"));
    assert_eq!(
        normalize_video_path(Path::new("out/video.avi")),
        PathBuf::from("out/video.avi.mp4")
    );
}

#[test]
fn video_args_follow_encode_options() {
    let opts = VideoEncodeOpts {
        extra_args: vec!["-preset".to_owned(), "fast".to_owned()],
        ..VideoEncodeOpts::default()
    };
    let fps = Fps::new(30000, 1001).unwrap();
    let args = strs(&video_args(
        Path::new("imgs/img_%02d.png"),
        fps,
        Path::new("video.mp4"),
        &opts,
    ));

    let pos = |s: &str| args.iter().position(|a| a == s).unwrap();
    assert_eq!(args[pos("-framerate") + 1], "30000/1001");
    assert_eq!(args[pos("-i") + 1], "imgs/img_%02d.png");
    assert_eq!(args[pos("-c:v") + 1], "libx264");
    assert_eq!(args[pos("-crf") + 1], "24");
    assert_eq!(args[pos("-pix_fmt") + 1], "yuv420p");
    assert_eq!(args[pos("-preset") + 1], "fast");
    assert_eq!(args[pos("-loglevel") + 1], "error");
    assert_eq!(&args[args.len() - 2..], ["video.mp4", "-y"]);
}

#[test]
fn gif_args_build_palette_filter() {
    let args = strs(&gif_args(
        Path::new("v.mp4"),
        Path::new("v.gif"),
        &GifOpts { fps: 12, height: 200 },
    ));
    let vf = args.iter().position(|a| a == "-vf").unwrap();
    assert_eq!(
        args[vf + 1],
        "fps=12,scale=-1:200:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse"
    );
    assert!(args.windows(2).any(|w| w[0] == "-loop" && w[1] == "0"));
}

#[test]
fn ensure_parent_dir_creates_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b").join("video.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(out.parent().unwrap().is_dir());
    ensure_parent_dir(Path::new("video.mp4")).unwrap();
}

#[test]
fn gif_from_missing_video_is_an_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = video_to_gif(
        &dir.path().join("nope.mp4"),
        &dir.path().join("out.gif"),
        &GifOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AnimError::Encode(_)));
}

#[test]
fn zero_gif_height_is_a_config_error() {
    let err = video_to_gif(
        Path::new("v.mp4"),
        Path::new("v.gif"),
        &GifOpts { fps: 10, height: 0 },
    )
    .unwrap_err();
    assert!(matches!(err, AnimError::Config(_)));
}

#[test]
fn encodes_rendered_images_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pattern = ImagePattern::new(dir.path().join("imgs"), FrameBound::Limited(3), "png");
    std::fs::create_dir_all(pattern.dir()).unwrap();
    for i in 0..3 {
        let mut fig = crate::render::figure::Figure::new(0.5, 0.5, 64.0);
        fig.plot(
            &[0.0, 1.0],
            &[i as f64 / 3.0, 1.0],
            2.0,
            crate::config::options::Rgba8::BLACK,
        );
        fig.save(
            &pattern.path_for(FrameIndex(i)),
            &crate::config::options::SaveOptions::default(),
        )
        .unwrap();
    }

    let out = images_to_video(
        &pattern,
        Fps::integer(5).unwrap(),
        &dir.path().join("video"),
        &VideoEncodeOpts::default(),
    )
    .unwrap();
    assert_eq!(out, dir.path().join("video.mp4"));
    assert!(std::fs::metadata(&out).unwrap().len() > 0);

    let gif = video_to_gif(&out, &dir.path().join("video.gif"), &GifOpts::default()).unwrap();
    assert!(gif.is_file());
}

#[test]
fn missing_images_surface_as_encode_error() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pattern = ImagePattern::new(dir.path().join("empty"), FrameBound::Limited(3), "png");
    let err = images_to_video(
        &pattern,
        Fps::integer(5).unwrap(),
        &dir.path().join("video.mp4"),
        &VideoEncodeOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AnimError::Encode(_)));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn encoder_failure_is_logged_before_it_is_returned() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();

    let err = tracing::subscriber::with_default(subscriber, || {
        encode_failure("exit status: 1", "imgs/img_%01d.png: No such file or directory\n")
    });

    assert!(matches!(err, AnimError::Encode(ref m) if m.contains("No such file")));
    let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(out.contains("ERROR"), "{out}");
    assert!(out.contains("ffmpeg exited with status exit status: 1"), "{out}");
}
