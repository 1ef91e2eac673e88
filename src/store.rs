use crate::*;

/// A surveyed point.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurveyPoint {
    /// The surveyor's point number.
    pub number: i32,
    /// Plan position, `[easting, northing]`.
    pub pos: Point2,
    /// Elevation.
    pub z: f64,
    pub description: String,
}

impl SurveyPoint {
    pub fn xyz(&self) -> Point3 {
        self.pos.with_z(self.z)
    }
}

/// The canonical collection of survey points.
///
/// Points keep their insertion order, downstream structures refer to a point by its `u32`
/// _index_ into the store, never by its number.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<SurveyPoint>", into = "Vec<SurveyPoint>")]
pub struct PointStore {
    points: Vec<SurveyPoint>,
    by_number: HashMap<i32, u32>,
}

impl PointStore {
    /// Add a point, returning the number it was stored under.
    ///
    /// If a point with `number` already exists it is replaced when `overwrite` is set.
    /// Otherwise the new point gets the next free number: one more than the largest number, or
    /// one less than the smallest for negative (generated) numbers.
    pub fn add(
        &mut self,
        number: i32,
        pos: Point2,
        z: f64,
        description: &str,
        overwrite: bool,
    ) -> Result<i32> {
        if !(pos[0].is_finite() && pos[1].is_finite() && z.is_finite()) {
            log::warn!("point {} rejected, non-finite coordinate", number);
            return Err(TinError::InvalidPoint { number });
        }

        let mut point = SurveyPoint {
            number,
            pos,
            z,
            description: description.to_string(),
        };

        match self.by_number.get(&number) {
            Some(&i) if overwrite => {
                self.points[i as usize] = point;
                return Ok(number);
            }
            Some(_) => {
                point.number = self.next_free(number)?;
                log::debug!("point {} exists, renumbered to {}", number, point.number);
            }
            None => (),
        }

        let n = point.number;
        self.by_number.insert(n, self.points.len() as u32);
        self.points.push(point);
        Ok(n)
    }

    /// The number after the largest, or before the smallest for a negative `number`.
    fn next_free(&self, number: i32) -> Result<i32> {
        let numbers = self.by_number.keys().copied();
        let next = if number < 0 {
            match numbers.min() {
                Some(n) if n < 0 => n.checked_sub(1),
                _ => Some(-1),
            }
        } else {
            match numbers.max() {
                Some(n) if n > 0 => n.checked_add(1),
                _ => Some(1),
            }
        };
        next.ok_or(TinError::NoFreeNumber { number })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&SurveyPoint> {
        self.points.get(index as usize)
    }

    /// The index of the point numbered `number`.
    pub fn index_of(&self, number: i32) -> Option<u32> {
        self.by_number.get(&number).copied()
    }

    /// The number of the point at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn number(&self, index: u32) -> i32 {
        self.points[index as usize].number
    }

    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn xy(&self, index: u32) -> Point2 {
        self.points[index as usize].pos
    }

    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn xyz(&self, index: u32) -> Point3 {
        self.points[index as usize].xyz()
    }

    pub fn z(&self, index: u32) -> f64 {
        self.points[index as usize].z
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SurveyPoint> + '_ {
        self.points.iter()
    }

    /// The indices of the topographic points, as selected by `criteria`.
    pub fn select(&self, criteria: &Criteria) -> Vec<u32> {
        (0..self.len() as u32)
            .filter(|&i| criteria.is_topo(&self.points[i as usize]))
            .collect()
    }
}

impl Aabb for PointStore {
    type Space = Point3;

    fn aabb(&self) -> Extents3 {
        self.points.iter().map(SurveyPoint::xyz).collect()
    }
}

impl From<Vec<SurveyPoint>> for PointStore {
    fn from(points: Vec<SurveyPoint>) -> Self {
        let by_number = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.number, i as u32))
            .collect();
        Self { points, by_number }
    }
}

impl From<PointStore> for Vec<SurveyPoint> {
    fn from(store: PointStore) -> Self {
        store.points
    }
}

/// One rule for selecting topographic points.
///
/// Empty fields match anything.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Criterion {
    /// Inclusive point number range.
    pub numbers: Option<(i32, i32)>,
    /// Inclusive elevation range.
    pub elevations: Option<(f64, f64)>,
    /// Substring of the description.
    pub description: String,
    /// Matching points are topographic.
    pub topo: bool,
}

impl Criterion {
    pub fn matches(&self, point: &SurveyPoint) -> bool {
        let num = self
            .numbers
            .map(|(lo, hi)| (lo..=hi).contains(&point.number))
            .unwrap_or(true);
        let elev = self
            .elevations
            .map(|(lo, hi)| point.z >= lo && point.z <= hi)
            .unwrap_or(true);
        num && elev && point.description.contains(self.description.as_str())
    }
}

/// An ordered list of [`Criterion`]; the _last_ matching criterion decides.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Criteria(pub Vec<Criterion>);

impl Criteria {
    /// With no criteria every point is topographic, otherwise a point matching no criterion
    /// is excluded.
    pub fn is_topo(&self, point: &SurveyPoint) -> bool {
        if self.0.is_empty() {
            return true;
        }

        self.0
            .iter()
            .rev()
            .find(|c| c.matches(point))
            .map(|c| c.topo)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_and_renumbering() {
        let mut s = PointStore::default();
        assert_eq!(s.add(5, [0.0, 0.0], 1.0, "A", false), Ok(5));
        assert_eq!(s.add(9, [1.0, 0.0], 2.0, "B", false), Ok(9));
        // exists, no overwrite => next free
        assert_eq!(s.add(5, [2.0, 0.0], 3.0, "C", false), Ok(10));
        // overwrite in place
        assert_eq!(s.add(9, [3.0, 0.0], 4.0, "D", true), Ok(9));
        assert_eq!(s.len(), 3);
        assert_eq!(s.index_of(9), Some(1));
        assert_eq!(s.xyz(1), [3.0, 0.0, 4.0]);

        // negative numbers count downwards
        assert_eq!(s.add(-1, [4.0, 0.0], 0.0, "", false), Ok(-1));
        assert_eq!(s.add(-1, [5.0, 0.0], 0.0, "", false), Ok(-2));

        assert_eq!(
            s.add(7, [f64::NAN, 0.0], 0.0, "", false),
            Err(TinError::InvalidPoint { number: 7 })
        );
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn renumbering_runs_out() {
        let mut s = PointStore::default();
        assert_eq!(s.add(i32::MAX, [0.0, 0.0], 1.0, "", false), Ok(i32::MAX));
        assert_eq!(
            s.add(i32::MAX, [1.0, 0.0], 1.0, "", false),
            Err(TinError::NoFreeNumber { number: i32::MAX })
        );

        assert_eq!(s.add(i32::MIN, [2.0, 0.0], 1.0, "", false), Ok(i32::MIN));
        assert_eq!(s.add(-3, [3.0, 0.0], 1.0, "", false), Ok(-3));
        assert_eq!(
            s.add(-3, [4.0, 0.0], 1.0, "", false),
            Err(TinError::NoFreeNumber { number: -3 })
        );

        // nothing was overwritten
        assert_eq!(s.len(), 3);
        assert_eq!(s.index_of(i32::MAX), Some(0));
        assert_eq!(s.index_of(-3), Some(2));
        assert_eq!(s.xy(0), [0.0, 0.0]);
    }

    #[test]
    fn serde_roundtrip_rebuilds_lookup() {
        let s = dummy_store();
        let v: Vec<SurveyPoint> = s.clone().into();
        let t = PointStore::from(v);
        assert_eq!(s, t);
        assert_eq!(t.index_of(7), Some(6));
    }

    #[test]
    fn criteria_last_match_wins() {
        let mut s = PointStore::default();
        s.add(1, [0.0, 0.0], 10.0, "TOPO", false).unwrap();
        s.add(2, [1.0, 0.0], 12.0, "FENCE", false).unwrap();
        s.add(3, [2.0, 0.0], 50.0, "TOPO SPOT", false).unwrap();
        s.add(4, [3.0, 0.0], 11.0, "TREE", false).unwrap();

        assert_eq!(s.select(&Criteria::default()), vec![0, 1, 2, 3]);

        let criteria = Criteria(vec![
            Criterion {
                description: "TOPO".into(),
                topo: true,
                ..Default::default()
            },
            Criterion {
                elevations: Some((40.0, 60.0)),
                topo: false,
                ..Default::default()
            },
            Criterion {
                numbers: Some((4, 4)),
                topo: true,
                ..Default::default()
            },
        ]);

        // 1 topo, 2 no match, 3 topo then excluded by elevation, 4 by number
        assert_eq!(s.select(&criteria), vec![0, 3]);
    }

    #[test]
    fn aabb_of_store() {
        let s = dummy_store();
        let e = s.aabb();
        assert!(e.origin[0] >= 0.0);
        let (lo, hi) = e.z_range();
        assert!(lo < hi);
        assert_eq!(hi, 100.0 - 25.0 / 50.0);
    }
}
