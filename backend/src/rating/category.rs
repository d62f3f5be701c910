use crate::config::settings::CategoryBand;
use crate::errors::RatingError;

use super::types::RatingValue;

/// Validated partition of the rating axis into named categories.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    bands: Vec<CategoryBand>,
}

impl CategoryTable {
    /// Builds the table, checking that the bands are ordered, contiguous and
    /// cover `[min_rating, max_rating]`.
    pub fn new(
        bands: Vec<CategoryBand>,
        min_rating: RatingValue,
        max_rating: RatingValue,
    ) -> Result<Self, RatingError> {
        let first = bands
            .first()
            .ok_or_else(|| RatingError::configuration("category table is empty"))?;
        let last = bands.last().unwrap_or(first);

        for band in &bands {
            check_band(band)?;
        }
        check_contiguous(&bands)?;
        check_unique_names(&bands)?;

        if first.min_rating > min_rating || last.max_rating < max_rating {
            return Err(RatingError::configuration(format!(
                "category table covers [{}, {}] but ratings range over [{}, {}]",
                first.min_rating, last.max_rating, min_rating, max_rating
            )));
        }

        Ok(Self { bands })
    }

    /// Category for `rating`. Ratings outside the table fall back to the
    /// lowest category.
    pub fn classify_category(&self, rating: RatingValue) -> &str {
        let lowest = &self.bands[0];
        if rating == lowest.min_rating {
            return &lowest.name;
        }

        self.bands
            .iter()
            .find(|band| rating > band.min_rating && rating <= band.max_rating)
            .unwrap_or(lowest)
            .name
            .as_str()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bands.iter().any(|b| b.name == name)
    }
}

fn check_band(band: &CategoryBand) -> Result<(), RatingError> {
    if band.name.trim().is_empty() {
        return Err(RatingError::configuration("category name must not be empty"));
    }
    if !band.min_rating.is_finite() || !band.max_rating.is_finite() {
        return Err(RatingError::configuration(format!(
            "category {} has a non-finite bound",
            band.name
        )));
    }
    if band.min_rating >= band.max_rating {
        return Err(RatingError::configuration(format!(
            "category {} has an empty range [{}, {}]",
            band.name, band.min_rating, band.max_rating
        )));
    }
    Ok(())
}

fn check_contiguous(bands: &[CategoryBand]) -> Result<(), RatingError> {
    for pair in bands.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        if lower.max_rating < upper.min_rating {
            return Err(RatingError::configuration(format!(
                "gap between categories {} and {}",
                lower.name, upper.name
            )));
        }
        if lower.max_rating > upper.min_rating {
            return Err(RatingError::configuration(format!(
                "categories {} and {} overlap",
                lower.name, upper.name
            )));
        }
    }
    Ok(())
}

fn check_unique_names(bands: &[CategoryBand]) -> Result<(), RatingError> {
    for (idx, band) in bands.iter().enumerate() {
        if bands[..idx].iter().any(|b| b.name == band.name) {
            return Err(RatingError::configuration(format!(
                "category {} is defined twice",
                band.name
            )));
        }
    }
    Ok(())
}
