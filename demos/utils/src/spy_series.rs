use plotters::prelude::*;
use num_traits::Zero;
use totsu::MatBuild;
use totsu_core::LinAlgEx;

/// Filled cells at the nonzero entries of `mat`, with row 0 at the top.
pub fn spy_series<L, S>(mat: &MatBuild<L>, style: S) -> Vec<Rectangle<(usize, usize)>>
where L: LinAlgEx, S: Into<ShapeStyle>
{
    let style = style.into();
    let (nr, nc) = mat.size();

    let mut cells = Vec::new();
    for c in 0.. nc {
        for r in 0.. nr {
            if mat[(r, c)] != L::F::zero() {
                cells.push(Rectangle::new([(c, nr - r - 1), (c + 1, nr - r)], style.clone()));
            }
        }
    }
    cells
}
