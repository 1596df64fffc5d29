// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::error::{RenderError, RenderResult};
use crate::core::filter::ReconstructionFilter;
use crate::core::properties::Properties;
use crate::filters::FilterRegistry;
use crate::integrators::ptracer::{CaptureSettings, ParticleTracerSettings};
use crate::renderers::parallel::{LocalScheduler, ResultTransport};

/// Job configuration read from an `<integrator type="ptracer">` file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub integrator: Properties,
    pub filter_type: String,
    pub filter: Properties,
    /// 0 uses every available core.
    pub threads: usize,
    pub transport: ResultTransport,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            integrator: Properties::new(),
            filter_type: String::from("gaussian"),
            filter: Properties::new(),
            threads: 0,
            transport: ResultTransport::InProcess,
        }
    }
}

impl RenderConfig {
    pub fn capture_settings(&self) -> RenderResult<CaptureSettings> {
        let props = &self.integrator;
        let max_depth = props.get_integer("maxDepth", -1)?;
        if max_depth < -1 || max_depth > i32::MAX as i64 {
            return Err(RenderError::Parse(format!("maxDepth must be -1 or non-negative, got {}", max_depth)));
        }
        let rr_depth = props.get_integer("rrDepth", 5)?;
        if rr_depth < 1 || rr_depth > i32::MAX as i64 {
            return Err(RenderError::Parse(format!("rrDepth must be positive, got {}", rr_depth)));
        }

        Ok(CaptureSettings {
            tracer: ParticleTracerSettings {
                max_depth: max_depth as i32,
                rr_depth: rr_depth as i32,
                multiple_scattering: props.get_boolean("multipleScattering", true)?,
            },
            sample_count: non_negative(props, "sampleCount", 0)?,
            samples_per_pixel: non_negative(props, "samplesPerPixel", 1)?.max(1),
            granularity: non_negative(props, "granularity", 0)?,
        })
    }

    pub fn create_filter(&self, registry: &FilterRegistry) -> RenderResult<Arc<dyn ReconstructionFilter>> {
        let filter = registry.instantiate(&self.filter_type, &self.filter)?;
        Ok(Arc::from(filter))
    }

    pub fn scheduler(&self) -> LocalScheduler {
        LocalScheduler::new(self.threads).with_transport(self.transport)
    }
}

fn non_negative(props: &Properties, name: &str, default: i64) -> RenderResult<u64> {
    let value = props.get_integer(name, default)?;
    if value < 0 {
        return Err(RenderError::Parse(format!("{} must not be negative, got {}", name, value)));
    }
    Ok(value as u64)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> RenderResult<RenderConfig> {
    let xml = fs::read_to_string(path.as_ref())?;
    parse_config(&xml)
}

pub fn parse_config(xml: &str) -> RenderResult<RenderConfig> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut parser = ConfigParser::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => parser.element(&e, false)?,
            Ok(Event::Empty(e)) => parser.element(&e, true)?,
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"rfilter" => parser.in_rfilter = false,
                    b"integrator" => parser.in_integrator = false,
                    _ => {}
                }
            }
            Err(e) => {
                return Err(RenderError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if !parser.seen_integrator {
        return Err(RenderError::MissingField("integrator"));
    }
    parser.config.capture_settings()?;
    Ok(parser.config)
}

#[derive(Default)]
struct ConfigParser {
    defaults: HashMap<String, String>,
    config: RenderConfig,
    in_integrator: bool,
    in_rfilter: bool,
    seen_integrator: bool,
}

impl ConfigParser {
    /// Handle an opening tag. Self-closing tags never get an end event, so
    /// they do not open a scope.
    fn element(&mut self, e: &BytesStart<'_>, empty: bool) -> RenderResult<()> {
        match e.name().as_ref() {
            b"default" => {
                if let (Some(k), Some(v)) = (attribute(e, b"name"), attribute(e, b"value")) {
                    self.defaults.insert(k, v);
                }
            }
            b"integrator" => {
                let integrator_type = self.resolved(e, b"type")
                    .ok_or(RenderError::MissingField("integrator.type"))?;
                if integrator_type != "ptracer" {
                    return Err(RenderError::Parse(format!("unsupported integrator: {}", integrator_type)));
                }
                self.seen_integrator = true;
                self.in_integrator = !empty;
            }
            b"rfilter" => {
                if self.in_integrator {
                    self.config.filter_type = self.resolved(e, b"type")
                        .ok_or(RenderError::MissingField("rfilter.type"))?;
                    self.in_rfilter = !empty;
                }
            }
            b"scheduler" => {
                if let Some(threads) = self.resolved(e, b"threads") {
                    self.config.threads = threads.parse::<usize>()
                        .map_err(|_| RenderError::Parse(format!("invalid thread count: {}", threads)))?;
                }
                if let Some(transport) = self.resolved(e, b"transport") {
                    self.config.transport = transport.parse()?;
                }
            }
            b"integer" | b"float" | b"boolean" | b"string" => {
                let name = attribute(e, b"name").ok_or(RenderError::MissingField("property.name"))?;
                let value = self.resolved(e, b"value").ok_or(RenderError::MissingField("property.value"))?;
                if self.in_rfilter {
                    self.config.filter.set(&name, &value);
                } else if self.in_integrator {
                    self.config.integrator.set(&name, &value);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resolved(&self, e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
        attribute(e, key).map(|raw| resolve_value(&raw, &self.defaults))
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr.unescape_value().unwrap_or_default().to_string())
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::filter_border;
    use crate::filters::filter_registry;
    use std::io::Write;

    const CONFIG: &str = r#"
        <scene version="0.6.0">
            <default name="spp" value="4"/>
            <default name="depth" value="6"/>
            <integrator type="ptracer">
                <integer name="maxDepth" value="$depth"/>
                <integer name="samplesPerPixel" value="$spp"/>
                <integer name="granularity" value="5000"/>
                <boolean name="multipleScattering" value="false"/>
                <rfilter type="tent">
                    <float name="radius" value="1.5"/>
                </rfilter>
            </integrator>
            <scheduler threads="3" transport="serialized"/>
        </scene>
    "#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(CONFIG).unwrap();
        let settings = config.capture_settings().unwrap();
        assert_eq!(settings.tracer.max_depth, 6);
        assert_eq!(settings.tracer.rr_depth, 5);
        assert!(!settings.tracer.multiple_scattering);
        assert_eq!(settings.samples_per_pixel, 4);
        assert_eq!(settings.granularity, 5000);
        assert_eq!(settings.sample_count, 0);

        assert_eq!(config.filter_type, "tent");
        assert!(!config.integrator.has("radius"));
        let filter = config.create_filter(&filter_registry().unwrap()).unwrap();
        assert_eq!(filter.name(), "tent");
        assert_eq!(filter_border(filter.as_ref()), 1);

        let scheduler = config.scheduler();
        assert_eq!(scheduler.threads(), 3);
        assert_eq!(scheduler.transport(), ResultTransport::Serialized);
    }

    #[test]
    fn test_defaults_and_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"<scene><integrator type="ptracer"/></scene>"#).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.capture_settings().unwrap(), CaptureSettings::default());
        assert_eq!(config.filter_type, "gaussian");
        assert_eq!(config.transport, ResultTransport::InProcess);

        let filter = config.create_filter(&filter_registry().unwrap()).unwrap();
        assert_eq!(filter.radius().x, 2.0);
    }

    #[test]
    fn test_rejects_bad_configs() {
        assert!(parse_config("<scene/>").is_err());
        assert!(parse_config(r#"<integrator type="path"/>"#).is_err());
        assert!(parse_config(r#"<integrator type="ptracer"><integer name="maxDepth" value="-3"/></integrator>"#).is_err());
        assert!(parse_config(r#"<integrator type="ptracer"><boolean name="multipleScattering" value="maybe"/></integrator>"#).is_err());
        assert!(parse_config(r#"<integrator type="ptracer"/><scheduler transport="pigeon"/>"#).is_err());

        let config = parse_config(r#"<integrator type="ptracer"><rfilter type="lanczos"/></integrator>"#).unwrap();
        assert!(config.create_filter(&filter_registry().unwrap()).is_err());

        let zero_tent = r#"<integrator type="ptracer"><rfilter type="tent"><float name="radius" value="0"/></rfilter></integrator>"#;
        let config = parse_config(zero_tent).unwrap();
        assert!(config.create_filter(&filter_registry().unwrap()).is_err());
    }
}
