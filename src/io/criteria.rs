//! Criteria files: `lo,hi,elo,ehi,description,topo` records.
//!
//! An empty number or elevation range matches any point, as does a number range of `0,0`.
use super::*;

/// Reads a criteria file, keeping the order of the records.
///
/// Returns the criteria and the records that could not be read, as
/// [`TinError::BadPointRecord`].
///
/// # Errors
/// If the text is not UTF-8.
pub fn from_criteria(text: &[u8]) -> Result<(Criteria, Vec<TinError>)> {
    let mut criteria = Vec::new();
    let mut skipped = Vec::new();

    for (n, line) in lines(text)? {
        if is_filler(line) {
            continue;
        }

        match csv::parse_line(line)
            .filter(|f| f.len() == 6)
            .and_then(|f| parse_criterion(&f))
        {
            Some(c) => criteria.push(c),
            None => {
                log::warn!("couldn't parse criterion on line {}: {}", n, line);
                skipped.push(TinError::BadPointRecord {
                    line: n,
                    text: line.to_string(),
                });
            }
        }
    }

    log::debug!("read {} criteria", criteria.len());
    Ok((Criteria(criteria), skipped))
}

fn parse_criterion(f: &[String]) -> Option<Criterion> {
    fn opt<T: std::str::FromStr>(s: &str) -> Option<Option<T>> {
        if s.is_empty() {
            Some(None)
        } else {
            s.parse().ok().map(Some)
        }
    }

    let lo = opt::<i32>(&f[0])?.unwrap_or(0);
    let hi = opt::<i32>(&f[1])?.unwrap_or(0);
    let elo = opt::<f64>(&f[2])?;
    let ehi = opt::<f64>(&f[3])?;
    let topo = opt::<i32>(&f[5])?.unwrap_or(0) != 0;

    Some(Criterion {
        numbers: (lo != 0 || hi != 0).then_some((lo, hi)),
        elevations: elo.zip(ehi),
        description: f[4].clone(),
        topo,
    })
}

pub fn to_criteria(criteria: &Criteria) -> Vec<u8> {
    let mut out = String::new();
    for c in &criteria.0 {
        let (lo, hi) = c
            .numbers
            .map(|(lo, hi)| (lo.to_string(), hi.to_string()))
            .unwrap_or_default();
        let (elo, ehi) = c
            .elevations
            .map(|(lo, hi)| (lo.to_string(), hi.to_string()))
            .unwrap_or_default();
        let fields = [
            lo,
            hi,
            elo,
            ehi,
            c.description.clone(),
            (c.topo as u8).to_string(),
        ];
        out.push_str(&csv::make_line(&fields));
        out.push('\n');
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading() {
        let text = b"\
,,,,,1
100,199,,,,0
,,90,95.5,TREE,1
0,0,,,FENCE,0
1,2,three,,,1
";
        let (c, skipped) = from_criteria(text).unwrap();
        assert_eq!(
            c.0,
            vec![
                Criterion {
                    topo: true,
                    ..Default::default()
                },
                Criterion {
                    numbers: Some((100, 199)),
                    ..Default::default()
                },
                Criterion {
                    elevations: Some((90.0, 95.5)),
                    description: "TREE".to_string(),
                    topo: true,
                    ..Default::default()
                },
                Criterion {
                    description: "FENCE".to_string(),
                    ..Default::default()
                },
            ]
        );
        assert_eq!(skipped.len(), 1);

        let p = |number, z, description: &str| SurveyPoint {
            number,
            pos: [0.0; 2],
            z,
            description: description.to_string(),
        };
        assert!(c.is_topo(&p(1, 0.0, "GROUND")));
        assert!(!c.is_topo(&p(150, 0.0, "GROUND")));
        assert!(c.is_topo(&p(150, 92.0, "TREE")));
        assert!(!c.is_topo(&p(3, 92.0, "FENCE")));
    }

    #[test]
    fn writing() {
        let c = Criteria(vec![
            Criterion {
                numbers: Some((1, 10)),
                elevations: Some((2.5, 3.0)),
                description: "a,b".to_string(),
                topo: true,
            },
            Criterion::default(),
        ]);
        let text = to_criteria(&c);
        assert_eq!(
            std::str::from_utf8(&text).unwrap(),
            "1,10,2.5,3,\"a,b\",1\n,,,,,0\n"
        );
        let (back, skipped) = from_criteria(&text).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(back, c);
    }
}
