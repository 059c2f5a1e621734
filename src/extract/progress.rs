/// Progress snapshot parsed from ffmpeg output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Position in the input, seconds
    pub time: f64,

    /// Percent of the input duration, when the duration is known
    pub percent: Option<f64>,

    /// Processing speed relative to realtime
    pub speed: Option<f64>,

    /// ffmpeg reported the end of processing
    pub finished: bool,
}

/// Parses ffmpeg's `-progress` key/value stream and classic `time=` stats lines
#[derive(Debug, Clone)]
pub struct ProgressParser {
    duration: Option<f64>,
    speed: Option<f64>,
    time: f64,
}

impl ProgressParser {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration: duration.filter(|d| *d > 0.0),
            speed: None,
            time: 0.0,
        }
    }

    /// Feed one line; returns a snapshot whenever the position changed or processing ended
    pub fn parse_line(&mut self, line: &str) -> Option<Progress> {
        let line = line.trim();

        if let Some((key, value)) = line.split_once('=') {
            if !line.contains(' ') {
                return self.parse_key_value(key, value.trim());
            }
        }

        // frame=  240 fps=0.0 q=-0.0 size=      12kB time=00:00:10.00 bitrate=   9.8kbits/s speed=  20x
        let mut time = None;
        for (key, value) in stats_pairs(line) {
            match key {
                "time" => time = parse_timestamp(value),
                "speed" => self.speed = parse_speed(value).or(self.speed),
                _ => {}
            }
        }

        let time = time?;
        self.time = time;
        Some(self.snapshot(false))
    }

    fn parse_key_value(&mut self, key: &str, value: &str) -> Option<Progress> {
        match key {
            // both are microseconds, out_time_ms is misnamed by ffmpeg
            "out_time_us" | "out_time_ms" => {
                let micros = value.parse::<i64>().ok().filter(|v| *v >= 0)?;
                self.time = micros as f64 / 1_000_000.0;
                Some(self.snapshot(false))
            }
            "out_time" => {
                self.time = parse_timestamp(value)?;
                Some(self.snapshot(false))
            }
            "speed" => {
                self.speed = parse_speed(value).or(self.speed);
                None
            }
            "progress" if value == "end" => {
                if let Some(duration) = self.duration {
                    self.time = self.time.max(duration);
                }
                Some(self.snapshot(true))
            }
            _ => None,
        }
    }

    fn snapshot(&self, finished: bool) -> Progress {
        let percent = if finished {
            Some(100.0)
        } else {
            self.duration
                .map(|duration| (self.time / duration * 100.0).clamp(0.0, 100.0))
        };

        Progress {
            time: self.time,
            percent,
            speed: self.speed,
            finished,
        }
    }
}

/// `key=value` pairs of a stats line, tolerating padding after the `=`
fn stats_pairs(line: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    let mut rest = line;

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].split_whitespace().last().unwrap_or("");
        let after = rest[eq + 1..].trim_start();
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        pairs.push((key, &after[..end]));
        rest = &after[end..];
    }

    pairs
}

/// Parse `HH:MM:SS.ff`, also accepting a bare number of seconds
pub fn parse_timestamp(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.starts_with('-') || value == "N/A" {
        return None;
    }

    let mut seconds = 0.0;
    for part in value.split(':') {
        seconds = seconds * 60.0 + part.parse::<f64>().ok()?;
    }
    Some(seconds)
}

fn parse_speed(value: &str) -> Option<f64> {
    value.trim().trim_end_matches('x').trim().parse::<f64>().ok()
}
