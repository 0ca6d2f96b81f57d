//! UCI `info` lines.
//!
//! The controller only needs a summary of how far a search got, so unknown
//! fields are skipped rather than rejected.

/// Evaluation from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Hundredths of a pawn.
    Cp(i32),
    /// Moves to mate; negative when the side to move is being mated.
    Mate(i32),
}

/// Progress report from a running search. Fields the engine left out are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Nominal depth reached, in plies.
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub score: Option<Score>,
    /// Set when the score is only a lower or upper bound.
    pub bound: bool,
    pub nodes: Option<u64>,
    /// Milliseconds since `go`.
    pub time: Option<u64>,
    /// Expected line of play, starting with the current best move.
    pub pv: Vec<String>,
    /// Free text after `string`.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Renders the fields that are set as one `info` line.
    pub fn to_uci(&self) -> String {
        let mut parts = vec!["info".to_string()];

        if let Some(d) = self.depth {
            parts.push(format!("depth {}", d));
        }
        if let Some(d) = self.seldepth {
            parts.push(format!("seldepth {}", d));
        }
        match self.score {
            Some(Score::Cp(cp)) => parts.push(format!("score cp {}", cp)),
            Some(Score::Mate(m)) => parts.push(format!("score mate {}", m)),
            None => {}
        }
        if let Some(n) = self.nodes {
            parts.push(format!("nodes {}", n));
        }
        if let Some(t) = self.time {
            parts.push(format!("time {}", t));
        }
        if !self.pv.is_empty() {
            parts.push(format!("pv {}", self.pv.join(" ")));
        }
        if let Some(ref s) = self.string {
            parts.push(format!("string {}", s));
        }

        parts.join(" ")
    }

    /// Parse UCI info line. Returns `None` if the line is not an `info` line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();
        while let Some(token) = tokens.next() {
            match token {
                "depth" => info.depth = tokens.next().and_then(|s| s.parse().ok()),
                "seldepth" => info.seldepth = tokens.next().and_then(|s| s.parse().ok()),
                "nodes" => info.nodes = tokens.next().and_then(|s| s.parse().ok()),
                "time" => info.time = tokens.next().and_then(|s| s.parse().ok()),
                "score" => {
                    let kind = tokens.next();
                    let value = tokens.next().and_then(|s| s.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(v)) => Some(Score::Cp(v)),
                        (Some("mate"), Some(v)) => Some(Score::Mate(v)),
                        _ => None,
                    };
                }
                "lowerbound" | "upperbound" => info.bound = true,
                "pv" => {
                    while let Some(mv) = tokens.next_if(|t| !is_info_keyword(t)) {
                        info.pv.push(mv.to_string());
                    }
                }
                "string" => {
                    info.string = Some(tokens.by_ref().collect::<Vec<_>>().join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "pv"
            | "multipv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "tbhits"
            | "string"
    )
}
