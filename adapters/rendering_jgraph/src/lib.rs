#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rendering backend that pipes jgraph scripts through `jgraph` and
//! ImageMagick `convert` to produce a JPEG.

mod config;

pub use config::{RenderConfig, RenderConfigError, RENDER_CONFIG_ENV};

use std::{
    io::Write,
    process::{Child, Command, Stdio},
};

use tilefall_rendering::{RenderError, RenderingBackend, Scene};

/// Backend that writes every presented scene to the configured image file.
#[derive(Clone, Debug, Default)]
pub struct JgraphBackend {
    config: RenderConfig,
}

impl JgraphBackend {
    /// Creates a backend using the provided pipeline configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Pipeline configuration in use.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn spawn_pipeline(&self) -> Result<(Child, Child), RenderError> {
        let mut jgraph = Command::new(&self.config.jgraph)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Launch {
                program: self.config.jgraph.clone(),
                source,
            })?;

        let Some(postscript) = jgraph.stdout.take() else {
            reap(&mut jgraph, &self.config.jgraph);
            return Err(RenderError::Io {
                program: self.config.jgraph.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "stdout was not captured",
                ),
            });
        };

        let convert = Command::new(&self.config.convert)
            .arg("-density")
            .arg(self.config.density.to_string())
            .arg("-")
            .arg("-quality")
            .arg(self.config.quality.to_string())
            .arg(&self.config.output)
            .stdin(Stdio::from(postscript))
            .spawn();

        match convert {
            Ok(convert) => Ok((jgraph, convert)),
            Err(source) => {
                reap(&mut jgraph, &self.config.jgraph);
                Err(RenderError::Launch {
                    program: self.config.convert.clone(),
                    source,
                })
            }
        }
    }
}

impl RenderingBackend for JgraphBackend {
    fn present(&mut self, scene: &Scene) -> Result<(), RenderError> {
        let script = scene.canvas().to_script()?;
        let (mut jgraph, mut convert) = self.spawn_pipeline()?;

        let written = match jgraph.stdin.take() {
            Some(mut stdin) => stdin.write_all(script.as_bytes()),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdin was not captured",
            )),
        };

        // Both children are always reaped, even after a failed write.
        let jgraph_status = wait(&mut jgraph, &self.config.jgraph);
        let convert_status = wait(&mut convert, &self.config.convert);

        written.map_err(|source| RenderError::Io {
            program: self.config.jgraph.clone(),
            source,
        })?;
        jgraph_status?;
        convert_status?;

        log::debug!(
            "rendered {} byte script to {}",
            script.len(),
            self.config.output.display()
        );
        Ok(())
    }
}

fn wait(child: &mut Child, program: &str) -> Result<(), RenderError> {
    let status = child.wait().map_err(|source| RenderError::Io {
        program: program.to_owned(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(RenderError::Exit {
            program: program.to_owned(),
            status: status.to_string(),
        })
    }
}

fn reap(child: &mut Child, program: &str) {
    if let Err(error) = child.kill().and_then(|()| child.wait().map(|_| ())) {
        log::warn!("failed to stop `{program}`: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_jgraph_is_a_launch_failure() {
        let mut backend = JgraphBackend::new(RenderConfig {
            jgraph: "tilefall-missing-jgraph-binary".to_owned(),
            ..RenderConfig::default()
        });

        let error = backend
            .present(&Scene::GameOver { score: 3 })
            .expect_err("missing program must fail");

        assert!(error.is_fatal(), "unexpected error: {error}");
        assert!(error.to_string().contains("tilefall-missing-jgraph-binary"));
    }
}
