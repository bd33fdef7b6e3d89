use image::GrayImage;

/// Windowed structure-tensor components for every pixel. Values inside
/// `border` of the image edge are zero and must not be scored.
pub(crate) struct TensorField {
    pub sxx: Vec<f32>,
    pub syy: Vec<f32>,
    pub sxy: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub border: usize,
}

/// Normalized 1-D Gaussian of half-width `radius`, sigma = radius / 2.
pub(crate) fn gaussian_kernel_1d(radius: usize) -> Vec<f32> {
    let sigma = (radius as f32 / 2.0).max(0.5);
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-(radius as i32)..=radius as i32)
        .map(|i| (-(i * i) as f32 / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable convolution of one gradient-product plane, written only where
/// the full kernel fits; everything else stays zero.
fn convolve_separable(
    src: &[f32],
    width: usize,
    height: usize,
    border: usize,
    kernel: &[f32],
) -> Vec<f32> {
    let radius = kernel.len() / 2;
    let mut horizontal = vec![0f32; width * height];
    for y in 0..height {
        for x in radius..width - radius {
            let mut acc = 0f32;
            for (k, &weight) in kernel.iter().enumerate() {
                acc += weight * src[y * width + x + k - radius];
            }
            horizontal[y * width + x] = acc;
        }
    }

    let mut out = vec![0f32; width * height];
    for y in border..height - border {
        for x in border..width - border {
            let mut acc = 0f32;
            for (k, &weight) in kernel.iter().enumerate() {
                acc += weight * horizontal[(y + k - radius) * width + x];
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Sobel gradients, element-wise products, and a Gaussian window of
/// half-width `block_size` weighting the products into the 2x2 structure
/// tensor.
pub(crate) fn structure_tensor(img: &GrayImage, block_size: usize) -> TensorField {
    let w = img.width() as usize;
    let h = img.height() as usize;
    let px = img.as_raw();
    let border = block_size + 1;

    let mut ix = vec![0f32; w * h];
    let mut iy = vec![0f32; w * h];

    if w > 2 && h > 2 {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let at = |dx: i32, dy: i32| -> f32 {
                    let xx = (x as i32 + dx) as usize;
                    let yy = (y as i32 + dy) as usize;
                    px[yy * w + xx] as f32
                };
                ix[y * w + x] = (at(1, -1) + 2.0 * at(1, 0) + at(1, 1))
                    - (at(-1, -1) + 2.0 * at(-1, 0) + at(-1, 1));
                iy[y * w + x] = (at(-1, 1) + 2.0 * at(0, 1) + at(1, 1))
                    - (at(-1, -1) + 2.0 * at(0, -1) + at(1, -1));
            }
        }
    }

    let (sxx, syy, sxy) = if w > 2 * border && h > 2 * border {
        let mut gxx = vec![0f32; w * h];
        let mut gyy = vec![0f32; w * h];
        let mut gxy = vec![0f32; w * h];
        for i in 0..w * h {
            gxx[i] = ix[i] * ix[i];
            gyy[i] = iy[i] * iy[i];
            gxy[i] = ix[i] * iy[i];
        }

        let kernel = gaussian_kernel_1d(block_size);
        (
            convolve_separable(&gxx, w, h, border, &kernel),
            convolve_separable(&gyy, w, h, border, &kernel),
            convolve_separable(&gxy, w, h, border, &kernel),
        )
    } else {
        (vec![0f32; w * h], vec![0f32; w * h], vec![0f32; w * h])
    };

    TensorField {
        sxx,
        syy,
        sxy,
        width: w,
        height: h,
        border,
    }
}
