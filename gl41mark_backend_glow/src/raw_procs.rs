/// Entry points called directly instead of through glow
///
/// glow hides the boolean result of glUnmapBuffer, turns a null
/// glGetString into an empty string, and does not expose
/// glProgramParameteri or the program pipeline calls in the form the
/// scenes need. These are resolved once from the context loader; a missing
/// symbol leaves its slot empty and the caller degrades.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;

type PfnGetString = unsafe extern "system" fn(name: u32) -> *const c_char;
type PfnGetStringi = unsafe extern "system" fn(name: u32, index: u32) -> *const c_char;
type PfnUnmapBuffer = unsafe extern "system" fn(target: u32) -> u8;
type PfnProgramParameteri = unsafe extern "system" fn(program: u32, pname: u32, value: i32);
type PfnGenProgramPipelines = unsafe extern "system" fn(n: i32, pipelines: *mut u32);
type PfnDeleteProgramPipelines = unsafe extern "system" fn(n: i32, pipelines: *const u32);
type PfnBindProgramPipeline = unsafe extern "system" fn(pipeline: u32);
type PfnUseProgramStages = unsafe extern "system" fn(pipeline: u32, stages: u32, program: u32);

macro_rules! resolve {
    ($loader:expr, $name:literal, $pfn:ty) => {{
        let ptr: *const c_void = $loader($name);
        if ptr.is_null() {
            None
        } else {
            Some(std::mem::transmute::<*const c_void, $pfn>(ptr))
        }
    }};
}

/// Directly resolved GL entry points
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RawProcs {
    get_string: Option<PfnGetString>,
    get_string_i: Option<PfnGetStringi>,
    unmap_buffer: Option<PfnUnmapBuffer>,
    program_parameter_i: Option<PfnProgramParameteri>,
    gen_program_pipelines: Option<PfnGenProgramPipelines>,
    delete_program_pipelines: Option<PfnDeleteProgramPipelines>,
    bind_program_pipeline: Option<PfnBindProgramPipeline>,
    use_program_stages: Option<PfnUseProgramStages>,
}

impl RawProcs {
    /// Resolve every entry point through `loader`
    ///
    /// # Safety
    ///
    /// `loader` must return either null or the address of the named GL
    /// function for the context that will be current when these are called.
    pub(crate) unsafe fn load(loader: &dyn Fn(&str) -> *const c_void) -> Self {
        Self {
            get_string: resolve!(loader, "glGetString", PfnGetString),
            get_string_i: resolve!(loader, "glGetStringi", PfnGetStringi),
            unmap_buffer: resolve!(loader, "glUnmapBuffer", PfnUnmapBuffer),
            program_parameter_i: resolve!(loader, "glProgramParameteri", PfnProgramParameteri),
            gen_program_pipelines: resolve!(loader, "glGenProgramPipelines", PfnGenProgramPipelines),
            delete_program_pipelines: resolve!(
                loader,
                "glDeleteProgramPipelines",
                PfnDeleteProgramPipelines
            ),
            bind_program_pipeline: resolve!(loader, "glBindProgramPipeline", PfnBindProgramPipeline),
            use_program_stages: resolve!(loader, "glUseProgramStages", PfnUseProgramStages),
        }
    }

    pub(crate) fn has_get_string(&self) -> bool {
        self.get_string.is_some()
    }

    /// glGetString; `None` when unresolved or when the driver returns null
    pub(crate) unsafe fn get_string(&self, name: u32) -> Option<String> {
        let f = self.get_string?;
        c_string(f(name))
    }

    /// glGetStringi; `None` when unresolved or when the driver returns null
    pub(crate) unsafe fn get_string_i(&self, name: u32, index: u32) -> Option<String> {
        let f = self.get_string_i?;
        c_string(f(name, index))
    }

    /// glUnmapBuffer; `None` when unresolved, otherwise whether the store survived
    pub(crate) unsafe fn unmap_buffer(&self, target: u32) -> Option<bool> {
        let f = self.unmap_buffer?;
        Some(f(target) != 0)
    }

    /// glProgramParameteri; false when unresolved
    pub(crate) unsafe fn program_parameter_i(&self, program: u32, pname: u32, value: i32) -> bool {
        match self.program_parameter_i {
            Some(f) => {
                f(program, pname, value);
                true
            }
            None => false,
        }
    }

    /// glGenProgramPipelines for a single name (0 when unresolved)
    pub(crate) unsafe fn gen_program_pipeline(&self) -> u32 {
        let mut name = 0u32;
        if let Some(f) = self.gen_program_pipelines {
            f(1, &mut name);
        }
        name
    }

    pub(crate) unsafe fn delete_program_pipeline(&self, pipeline: u32) {
        if let Some(f) = self.delete_program_pipelines {
            f(1, &pipeline);
        }
    }

    pub(crate) unsafe fn bind_program_pipeline(&self, pipeline: u32) {
        if let Some(f) = self.bind_program_pipeline {
            f(pipeline);
        }
    }

    pub(crate) unsafe fn use_program_stages(&self, pipeline: u32, stages: u32, program: u32) {
        if let Some(f) = self.use_program_stages {
            f(pipeline, stages, program);
        }
    }
}

unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}
