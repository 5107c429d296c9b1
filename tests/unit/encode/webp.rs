use std::io::Cursor;

use image::AnimationDecoder;

use super::*;

fn checker(width: u32, height: u32, on: [u8; 4]) -> FrameRGBA {
    let mut f = FrameRGBA::blank(width, height);
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 2 == 0 {
                let i = ((y * width + x) * 4) as usize;
                f.data[i..i + 4].copy_from_slice(&on);
            }
        }
    }
    f
}

struct FlakyCodec {
    failures_left: usize,
    init_calls: usize,
}

impl StillCodec for FlakyCodec {
    async fn initialize(&mut self) -> SmtxResult<()> {
        self.init_calls += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(SmtxError::codec_init("codec not available yet"));
        }
        Ok(())
    }

    async fn encode_still(&self, frame: &FrameRGBA) -> SmtxResult<Vec<u8>> {
        LosslessStillCodec.encode_still(frame).await
    }
}

#[test]
fn container_layout_is_extended_animated() {
    let frames = vec![
        checker(6, 4, [255, 0, 0, 255]),
        checker(6, 4, [0, 255, 0, 255]),
        checker(6, 4, [0, 0, 255, 255]),
    ];
    let mut enc = WebPFrameEncoder::new(EncoderSettings::default()).unwrap();
    let bytes = pollster::block_on(enc.encode(&frames, 6, 4)).unwrap();

    let riff_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    assert_eq!(riff_size + 8, bytes.len());

    let chunks = riff_chunks(&bytes).unwrap();
    let ids: Vec<_> = chunks.iter().map(|c| c.fourcc).collect();
    assert_eq!(ids, vec![*b"VP8X", *b"ANIM", *b"ANMF", *b"ANMF", *b"ANMF"]);

    let vp8x = chunks[0].payload;
    assert_eq!(vp8x[0], 0x12);
    assert_eq!(&vp8x[4..7], &[5, 0, 0]);
    assert_eq!(&vp8x[7..10], &[3, 0, 0]);

    assert_eq!(chunks[1].payload, &[0, 0, 0, 0, 0, 0]);

    let anmf = chunks[2].payload;
    assert_eq!(&anmf[12..15], &[225, 0, 0], "frame duration");
    assert_eq!(anmf[15], 0x02, "no blending, no disposal");
    assert!(enc.is_runtime_ready());
}

#[test]
fn decodes_back_to_three_frames() {
    let frames = vec![
        checker(4, 4, [10, 20, 30, 255]),
        checker(4, 4, [40, 50, 60, 255]),
        checker(4, 4, [70, 80, 90, 255]),
    ];
    let mut enc = WebPFrameEncoder::new(EncoderSettings::default()).unwrap();
    let bytes = pollster::block_on(enc.encode(&frames, 4, 4)).unwrap();

    let decoder = image::codecs::webp::WebPDecoder::new(Cursor::new(bytes)).unwrap();
    assert!(decoder.has_animation());
    let decoded = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(decoded.len(), 3);
    for (frame, src) in decoded.iter().zip(&frames) {
        let buf = frame.buffer();
        assert_eq!(buf.dimensions(), (4, 4));
        assert_eq!(buf.get_pixel(0, 0).0, src.pixel(0, 0).unwrap());
        assert_eq!(buf.get_pixel(1, 0).0[3], 0);
    }
}

#[test]
fn failed_initialization_is_retried_on_next_encode() {
    let codec = FlakyCodec {
        failures_left: 1,
        init_calls: 0,
    };
    let mut enc = WebPFrameEncoder::with_codec(codec, EncoderSettings::default()).unwrap();
    let frames = vec![checker(2, 2, [1, 2, 3, 255])];

    let err = pollster::block_on(enc.encode(&frames, 2, 2)).unwrap_err();
    assert!(matches!(err, SmtxError::CodecInit(_)));
    assert!(!enc.is_runtime_ready());

    pollster::block_on(enc.encode(&frames, 2, 2)).unwrap();
    assert!(enc.is_runtime_ready());
    pollster::block_on(enc.encode(&frames, 2, 2)).unwrap();
    assert_eq!(enc.codec.init_calls, 2);
}

#[test]
fn loop_count_is_written_to_anim_chunk() {
    let settings = EncoderSettings {
        loop_count: 3,
        ..EncoderSettings::default()
    };
    let mut enc = WebPFrameEncoder::new(settings).unwrap();
    let bytes = pollster::block_on(enc.encode(&[FrameRGBA::blank(2, 2)], 2, 2)).unwrap();
    let chunks = riff_chunks(&bytes).unwrap();
    assert_eq!(&chunks[1].payload[4..6], &[3, 0]);
}

#[test]
fn non_webp_input_is_rejected_by_chunk_parser() {
    assert!(riff_chunks(b"GIF89a").is_err());
    let mut truncated = b"RIFF\x10\x00\x00\x00WEBPVP8L\xff\x00\x00\x00".to_vec();
    truncated.extend_from_slice(&[0; 4]);
    assert!(riff_chunks(&truncated).is_err());
}

#[test]
fn odd_chunks_are_padded() {
    let mut out = Vec::new();
    push_chunk(&mut out, b"TEST", &[1, 2, 3]);
    assert_eq!(out.len(), 8 + 4);
    assert_eq!(out[11], 0);
}

#[test]
fn partial_alpha_is_kept_exactly() {
    let soft = [[200, 100, 50, 1], [10, 20, 30, 128], [255, 255, 255, 254], [7, 8, 9, 255]];
    let frames: Vec<FrameRGBA> = (0..3)
        .map(|shift| {
            let mut f = FrameRGBA::blank(2, 2);
            for i in 0..4 {
                let px = soft[(i + shift) % 4];
                f.data[i * 4..i * 4 + 4].copy_from_slice(&px);
            }
            f
        })
        .collect();
    let mut enc = WebPFrameEncoder::new(EncoderSettings::default()).unwrap();
    let bytes = pollster::block_on(enc.encode(&frames, 2, 2)).unwrap();

    let decoder = image::codecs::webp::WebPDecoder::new(Cursor::new(bytes)).unwrap();
    let decoded = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(decoded.len(), 3);
    for (frame, src) in decoded.iter().zip(&frames) {
        assert_eq!(frame.buffer().as_raw(), &src.data);
    }
}
