// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Create, write, read back: every format, every buffer kind, every flag combination.

use graphics_interface::{
    BufferKind, Error, GraphicsInterface, ResourceFlags, TextureFormat, f16, soft,
};

const ALL_FLAGS: [ResourceFlags; 4] = [
    ResourceFlags::empty(),
    ResourceFlags::CPU_READ,
    ResourceFlags::CPU_WRITE,
    ResourceFlags::CPU_READ.union(ResourceFlags::CPU_WRITE),
];

fn pattern(len: usize, seed: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + seed * 17) % 253) as u8).collect()
}

#[test]
fn textures_round_trip() {
    let mut gi = soft::SoftInterface::new(soft::Device::new());
    for (seed, format) in TextureFormat::ALL.into_iter().enumerate() {
        for flags in ALL_FLAGS {
            let (width, height) = (5, 3);
            let data = pattern(format.row_pitch(width) * height as usize, seed);
            let texture = gi
                .create_texture_2d(width, height, format, None, flags)
                .unwrap();
            gi.write_texture_2d(&texture, width, height, format, &data, data.len())
                .unwrap();
            let mut out = vec![0; data.len()];
            let out_len = out.len();
            gi.read_texture_2d(&mut out, out_len, &texture, width, height, format)
                .unwrap();
            assert_eq!(out, data, "{format:?} {flags:?}");
            gi.release_texture_2d(texture);
        }
    }
}

#[test]
fn buffers_round_trip() {
    let mut gi = soft::SoftInterface::new(soft::Device::new());
    for kind in BufferKind::ALL {
        for flags in ALL_FLAGS {
            let data = pattern(100, kind as usize);
            let buffer = gi.create_buffer(data.len(), kind, None, flags).unwrap();
            gi.write_buffer(&buffer, &data, data.len(), kind).unwrap();
            let mut out = vec![0; data.len()];
            let out_len = out.len();
            gi.read_buffer(&mut out, &buffer, out_len, kind).unwrap();
            assert_eq!(out, data, "{kind:?} {flags:?}");
            gi.release_buffer(buffer);
        }
    }
}

#[test]
fn initial_data_is_visible() {
    let mut gi = soft::SoftInterface::new(soft::Device::new());
    let texels: Vec<u8> = [1.0f32, -2.5, 3.25, 0.0]
        .iter()
        .flat_map(|v| f16::from_f32(*v).to_le_bytes())
        .collect();
    let texture = gi
        .create_texture_2d(2, 2, TextureFormat::Rf16, Some(&texels), ResourceFlags::empty())
        .unwrap();
    let mut out = vec![0; texels.len()];
    let out_len = out.len();
    gi.read_texture_2d(&mut out, out_len, &texture, 2, 2, TextureFormat::Rf16)
        .unwrap();
    let values: Vec<f32> = out
        .chunks_exact(2)
        .map(|c| f16::from_le_bytes([c[0], c[1]]).to_f32())
        .collect();
    assert_eq!(values, vec![1.0, -2.5, 3.25, 0.0]);
    gi.release_texture_2d(texture);

    let data = pattern(64, 9);
    let buffer = gi
        .create_buffer(64, BufferKind::Vertex, Some(&data), ResourceFlags::empty())
        .unwrap();
    let mut out = vec![0; 64];
    gi.read_buffer(&mut out, &buffer, 64, BufferKind::Vertex).unwrap();
    assert_eq!(out, data);
    gi.release_buffer(buffer);
}

#[test]
fn zero_size_is_a_no_op() {
    let device = soft::Device::new();
    let mut gi = soft::SoftInterface::new(device.clone());
    let data = pattern(48, 1);
    let texture = gi
        .create_texture_2d(3, 4, TextureFormat::RGBAu8, Some(&data), ResourceFlags::empty())
        .unwrap();
    let before = device.stats();
    let mut out = vec![0xaa; 48];
    gi.read_texture_2d(&mut out, 0, &texture, 3, 4, TextureFormat::RGBAu8)
        .unwrap();
    assert!(out.iter().all(|b| *b == 0xaa));
    gi.write_texture_2d(&texture, 3, 4, TextureFormat::RGBAu8, &[], 0)
        .unwrap();
    //size 0 wins even over mismatched parameters
    gi.write_texture_2d(&texture, 7, 7, TextureFormat::Rf32, &[], 0)
        .unwrap();
    assert_eq!(device.stats(), before);
    gi.read_texture_2d(&mut out, 48, &texture, 3, 4, TextureFormat::RGBAu8)
        .unwrap();
    assert_eq!(out, data);
    gi.release_texture_2d(texture);
}

#[test]
fn padded_rows_copy_row_by_row() {
    //3 RGBA8 texels = 12 bytes per row against 256-byte native rows
    let mut gi = soft::SoftInterface::new(soft::Device::new());
    let data = pattern(48, 4);
    for flags in ALL_FLAGS {
        let texture = gi
            .create_texture_2d(3, 4, TextureFormat::RGBAu8, None, flags)
            .unwrap();
        gi.write_texture_2d(&texture, 3, 4, TextureFormat::RGBAu8, &data, 48)
            .unwrap();
        let mut out = vec![0; 48];
        gi.read_texture_2d(&mut out, 48, &texture, 3, 4, TextureFormat::RGBAu8)
            .unwrap();
        assert_eq!(out, data, "{flags:?}");
        gi.release_texture_2d(texture);
    }
}

#[test]
fn partial_transfers_stop_mid_row() {
    let mut gi = soft::SoftInterface::new(soft::Device::new());
    let initial = vec![0xee; 4 * 4 * 4];
    for flags in [ResourceFlags::empty(), ResourceFlags::CPU_READ | ResourceFlags::CPU_WRITE] {
        let texture = gi
            .create_texture_2d(4, 4, TextureFormat::Ri32, Some(&initial), flags)
            .unwrap();
        //one row and two texels
        let update = pattern(24, 2);
        gi.write_texture_2d(&texture, 4, 4, TextureFormat::Ri32, &update, 24)
            .unwrap();
        let mut head = vec![0; 20];
        gi.read_texture_2d(&mut head, 20, &texture, 4, 4, TextureFormat::Ri32)
            .unwrap();
        assert_eq!(head, update[..20], "{flags:?}");
        let mut all = vec![0; 64];
        gi.read_texture_2d(&mut all, 64, &texture, 4, 4, TextureFormat::Ri32)
            .unwrap();
        assert_eq!(all[..24], update[..], "{flags:?}");
        assert!(all[24..].iter().all(|b| *b == 0xee), "{flags:?}");
        gi.release_texture_2d(texture);
    }
}

#[test]
fn partial_texel_writes_are_rejected() {
    let device = soft::Device::new();
    let mut gi = soft::SoftInterface::new(device.clone());
    let initial = vec![0xee; 4 * 4 * 4];
    for flags in [ResourceFlags::empty(), ResourceFlags::CPU_READ | ResourceFlags::CPU_WRITE] {
        let texture = gi
            .create_texture_2d(4, 4, TextureFormat::Rf32, Some(&initial), flags)
            .unwrap();
        let before = device.stats();
        assert_eq!(
            gi.write_texture_2d(&texture, 4, 4, TextureFormat::Rf32, &[1, 2, 3, 4, 5], 5),
            Err(Error::InvalidParameter),
            "{flags:?}"
        );
        assert_eq!(device.stats(), before, "{flags:?}");
        let mut out = vec![0; 64];
        gi.read_texture_2d(&mut out, 64, &texture, 4, 4, TextureFormat::Rf32)
            .unwrap();
        assert_eq!(out, initial, "{flags:?}");
        gi.release_texture_2d(texture);
    }
}

#[test]
fn oversized_texture_is_out_of_memory() {
    let device = soft::Device::new();
    let mut gi = soft::SoftInterface::new(device.clone());
    for flags in ALL_FLAGS {
        assert_eq!(
            gi.create_texture_2d(1 << 22, 1 << 22, TextureFormat::RGBAf32, None, flags)
                .err(),
            Some(Error::OutOfMemory),
            "{flags:?}"
        );
    }
    assert_eq!(device.live_resources(), 0);
    let buffer = gi
        .create_buffer(16, BufferKind::Compute, None, ResourceFlags::empty())
        .unwrap();
    gi.release_buffer(buffer);
}
