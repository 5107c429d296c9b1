use std::io::Cursor;

use super::*;

fn two_tone(width: u32, height: u32, color: [u8; 4]) -> FrameRGBA {
    let mut f = FrameRGBA::blank(width, height);
    // Left half opaque, right half transparent.
    for y in 0..height {
        for x in 0..width / 2 {
            let i = ((y * width + x) * 4) as usize;
            f.data[i..i + 4].copy_from_slice(&color);
        }
    }
    f
}

fn decode_rgba(bytes: &[u8]) -> (u16, u16, Vec<(u16, Vec<u8>)>) {
    let mut opts = ::gif::DecodeOptions::new();
    opts.set_color_output(::gif::ColorOutput::RGBA);
    let mut dec = opts.read_info(Cursor::new(bytes)).unwrap();
    let (w, h) = (dec.width(), dec.height());
    let mut frames = Vec::new();
    while let Some(frame) = dec.read_next_frame().unwrap() {
        frames.push((frame.delay, frame.buffer.to_vec()));
    }
    (w, h, frames)
}

#[test]
fn encodes_every_frame_at_declared_size() {
    let frames = vec![
        two_tone(8, 4, [255, 0, 0, 255]),
        two_tone(8, 4, [0, 255, 0, 255]),
        two_tone(8, 4, [0, 0, 255, 255]),
    ];
    let bytes = GifFrameEncoder::default().encode_now(&frames, 8, 4).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");

    let (w, h, decoded) = decode_rgba(&bytes);
    assert_eq!((w, h), (8, 4));
    assert_eq!(decoded.len(), 3);
    for (delay, _) in &decoded {
        assert_eq!(*delay, 23);
    }
    assert_eq!(&decoded[0].1[0..4], &[255, 0, 0, 255]);
    assert_eq!(&decoded[1].1[0..4], &[0, 255, 0, 255]);
    assert_eq!(decoded[2].1[7 * 4 + 3], 0, "right half stays transparent");
}

#[test]
fn identical_input_gives_identical_bytes() {
    let frames = vec![two_tone(6, 6, [10, 20, 30, 255]); 3];
    let a = GifFrameEncoder::default().encode_now(&frames, 6, 6).unwrap();
    let b = GifFrameEncoder::default().encode_now(&frames, 6, 6).unwrap();
    assert_eq!(a, b);
}

#[test]
fn async_path_matches_sync_path() {
    let frames = vec![two_tone(4, 4, [200, 100, 50, 255]); 2];
    let mut enc = GifFrameEncoder::default();
    let a = pollster::block_on(enc.encode(&frames, 4, 4)).unwrap();
    assert_eq!(a, enc.encode_now(&frames, 4, 4).unwrap());
}

#[test]
fn mismatched_frames_fail_with_encoding_error() {
    let frames = vec![FrameRGBA::blank(4, 4), FrameRGBA::blank(2, 2)];
    let err = GifFrameEncoder::default()
        .encode_now(&frames, 4, 4)
        .unwrap_err();
    assert!(matches!(err, SmtxError::Encoding(_)));
}

#[test]
fn oversized_canvas_is_rejected() {
    let frames = vec![FrameRGBA {
        width: 70_000,
        height: 1,
        data: vec![0; 70_000 * 4],
    }];
    assert!(
        GifFrameEncoder::default()
            .encode_now(&frames, 70_000, 1)
            .is_err()
    );
}

#[test]
fn delay_rounds_to_centiseconds() {
    assert_eq!(centiseconds(225), 23);
    assert_eq!(centiseconds(10), 1);
    assert_eq!(centiseconds(4), 0);
}

#[test]
fn neighbouring_shades_survive_a_round_trip() {
    let mut frame = FrameRGBA::blank(2, 1);
    frame.data.copy_from_slice(&[160, 0, 0, 255, 176, 0, 0, 255]);
    let frames = vec![frame; 3];
    let bytes = GifFrameEncoder::default().encode_now(&frames, 2, 1).unwrap();

    let (_, _, decoded) = decode_rgba(&bytes);
    for (_, buf) in &decoded {
        assert_eq!(buf, &[160, 0, 0, 255, 176, 0, 0, 255]);
    }
}
