//! Definition-file rendering.
//!
//! Renders a [`BuildState`] into the fixed section template. Section
//! order and the boilerplate comments inside each section are a
//! compatibility contract for downstream consumers that parse the
//! markers; do not reword them.

use super::state::BuildState;

/// Section template for the emitted definition file.
const FILE_TEMPLATE: &str = r#"
Bootstrap: {bootstrap}
From: {image}

%setup
    # Commands to be run on the host system after the os has been copied
    # Has access to $SINGULARITY_ROOTFS to access the root filesystem
    # Acts like ordinary shell
    {setup}


%files
    # Files to be copied to the container before %post
    # Docker ADD, COPY
    # Must be in the format:
    #
    # filename1
    # filename2 /home/placetogo/
    #
    # filename1 will be placed into the root of the filesystem
    {files}


%labels
    # Metadata to add to the image
    # Must be in the format
    #
    # <key> <value>
    # VERSION 5
    {labels}


%post
    # commands to be executed inside container during bootstrap
    # Has access to %files and %setup, and maybe %labels via /.singularity.d/labels.json
    # Has access to $SINGULARITY_ENVIRONMENT to be able to set build time generated environment variables available at run time
    # For example:
    #
    # echo 'export JAWA_SEZ=wutini' >> $SINGULARITY_ENVIRONMENT
    {post}


%environment
    # Environmental variables to be added AT RUN TIME
    # These variables are not available in %post
    # This must be in the form of:
    #
    # FOO=BAR
    # ABC=123
    # export FOO ABC
    #
    {environment}


%runscript
    # commands to be executed when the container runs
    if [ -z "$1" ]
    then
        exec {entrypoint} {cmd}
    else
        exec {entrypoint} "$@"
    fi


%test
    # Singularity can run tests, put that here
    # Acts like a normal shell
    {test}
"#;

/// Render the final definition text from a build state.
pub fn render(state: &BuildState) -> String {
    let image = state
        .base_image
        .as_ref()
        .map(|r| r.to_string())
        .unwrap_or_default();

    FILE_TEMPLATE
        .replace("{bootstrap}", &state.bootstrap)
        .replace("{image}", &image)
        .replace("{setup}", &state.setup)
        .replace("{files}", &state.files)
        .replace("{labels}", &state.labels)
        .replace("{post}", &state.post)
        .replace("{environment}", &state.environment_block())
        .replace("{entrypoint}", &state.entrypoint)
        .replace("{cmd}", &state.cmd)
        .replace("{test}", &state.test)
}
