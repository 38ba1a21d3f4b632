use candle_core::{Device, Result, Tensor};

pub fn mask_to_index(mask: &Tensor) -> Result<Tensor> {
    Tensor::from_iter(
        mask.to_vec1()?
            .into_iter()
            .enumerate()
            .filter_map(|(idx, m): (_, u8)| if m == 0 { None } else { Some(idx as u32) } ),
        mask.device(),
    )
}

/// `(size,)` u8 mask with 1 at every position in `indices`.
pub fn index_to_mask(indices: &[usize], size: usize, device: &Device) -> Result<Tensor> {
    let mut mask = vec![0u8; size];
    for &idx in indices {
        if idx >= size {
            candle_core::bail!("index {idx} out of range for mask of size {size}")
        }
        mask[idx] = 1;
    }
    Tensor::from_vec(mask, size, device)
}
