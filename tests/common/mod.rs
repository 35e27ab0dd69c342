#![allow(dead_code)]

use std::sync::Arc;

use cellforge::{
    Catalog, Diagnostic, Engine, EngineConfig, Evaluator, GeometryBuilder, HeadlessBackend, PassReport,
    Point3, Segment,
};

/// Toy morphology: soma, one axon segment, two dendrite segments.
///
/// Regions understood: `(all)`, `(tag N)`. Locsets: `(root)`,
/// `(terminal)`, `(location SEG POS)` with `POS` in `[0, 1]`. Iexprs are
/// plain numbers.
pub struct StubMorphology {
    segments: Vec<(u32, Segment)>,
}

fn seg(tag: u32, from: f32, to: f32, radius: f32) -> (u32, Segment) {
    (
        tag,
        Segment {
            prox: Point3::new(from, 0.0, 0.0),
            prox_radius: radius,
            dist: Point3::new(to, 0.0, 0.0),
            dist_radius: radius,
        },
    )
}

impl Default for StubMorphology {
    fn default() -> Self {
        Self {
            segments: vec![
                seg(1, 0.0, 10.0, 5.0),
                seg(2, 10.0, 60.0, 0.5),
                seg(3, -0.0, -40.0, 1.0),
                seg(3, -40.0, -80.0, 0.8),
            ],
        }
    }
}

fn parse_error(kind: &str, text: &str) -> Diagnostic {
    let head = text
        .trim_start_matches('(')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(')');
    Diagnostic::new(format!("parse error:{kind}:unexpected token '{head}'"))
}

impl Evaluator for StubMorphology {
    type Region = Vec<usize>;
    type Locset = Vec<Point3>;
    type Expr = f64;

    fn parse_region(&self, text: &str) -> Result<Vec<usize>, Diagnostic> {
        if text == "(all)" {
            return Ok((0..self.segments.len()).collect());
        }
        let tag = text
            .strip_prefix("(tag ")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|n| n.trim().parse::<u32>().ok())
            .ok_or_else(|| parse_error("region", text))?;
        Ok(self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, (t, _))| *t == tag)
            .map(|(i, _)| i)
            .collect())
    }

    fn parse_locset(&self, text: &str) -> Result<Vec<Point3>, Diagnostic> {
        match text {
            "(root)" => return Ok(vec![self.segments[0].1.prox]),
            "(terminal)" => {
                return Ok(vec![self.segments[1].1.dist, self.segments[3].1.dist]);
            }
            _ => {}
        }
        let args: Vec<&str> = text
            .strip_prefix("(location ")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| parse_error("locset", text))?
            .split_whitespace()
            .collect();
        let [branch, pos] = args.as_slice() else {
            return Err(Diagnostic::new("parse error:locset:location expects 2 arguments"));
        };
        let branch: usize = branch
            .parse()
            .map_err(|_| Diagnostic::new("parse error:locset:invalid branch"))?;
        let pos: f32 = pos
            .parse()
            .map_err(|_| Diagnostic::new("parse error:locset:invalid position"))?;
        let Some((_, s)) = self.segments.get(branch) else {
            return Err(Diagnostic::new(format!("parse error:locset:no branch {branch}")));
        };
        if !(0.0..=1.0).contains(&pos) {
            return Err(Diagnostic::new(format!(
                "parse error:locset:position {pos} outside [0, 1]"
            )));
        }
        Ok(vec![Point3::new(
            s.prox.x + (s.dist.x - s.prox.x) * pos,
            0.0,
            0.0,
        )])
    }

    fn parse_iexpr(&self, text: &str) -> Result<f64, Diagnostic> {
        text.parse().map_err(|_| parse_error("iexpr", text))
    }
}

impl GeometryBuilder<StubMorphology> for StubMorphology {
    fn segments_for(&self, region: &Vec<usize>) -> Vec<Segment> {
        region.iter().map(|&i| self.segments[i].1).collect()
    }

    fn points_for(&self, locset: &Vec<Point3>) -> Vec<Point3> {
        locset.clone()
    }
}

/// Engine, morphology and headless backend wired together.
pub struct Harness {
    pub engine: Engine<StubMorphology>,
    pub morphology: StubMorphology,
    pub backend: HeadlessBackend,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::from_engine(Engine::new(Arc::new(Catalog::default_catalog()), config))
    }

    pub fn from_engine(engine: Engine<StubMorphology>) -> Self {
        Self {
            engine,
            morphology: StubMorphology::default(),
            backend: HeadlessBackend::new(),
        }
    }

    /// Runs one pass and checks every store afterwards.
    pub fn pass(&mut self) -> PassReport {
        let report = self
            .engine
            .update(&self.morphology, &self.morphology, &mut self.backend)
            .unwrap();
        self.engine.check_invariants().unwrap();
        report
    }
}
