use crate::domain::chart::{
    PriceScaleId, RenderBackend, ScaleRegion, SeriesData, SeriesId, SeriesKind, SeriesStyle,
    SurfaceSize,
};
use crate::domain::errors::RenderError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// One call a backend received, tagged with the backend instance it went to.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Create { surface: u32, id: SeriesId, kind: SeriesKind, scale: PriceScaleId },
    SetData { surface: u32, id: SeriesId, len: usize },
    Remove { surface: u32, id: SeriesId },
    ConfigureScale { surface: u32, scale: PriceScaleId, region: ScaleRegion },
    Resize { surface: u32, size: SurfaceSize },
    FitContent { surface: u32 },
    Dispose { surface: u32 },
}

/// Shared record of backend calls, readable after the backend is gone.
pub type Journal = Rc<RefCell<Vec<BackendCall>>>;

type DataHook = Box<dyn FnMut(SeriesId)>;

/// In-memory backend for tests and hosts without a canvas.
///
/// Keeps the latest data of every series and appends each call to a journal.
pub struct HeadlessBackend {
    surface: u32,
    journal: Journal,
    series: BTreeMap<SeriesId, (SeriesStyle, SeriesData)>,
    size: SurfaceSize,
    disposed: bool,
    on_set_data: Option<DataHook>,
}

impl HeadlessBackend {
    pub fn new(surface: u32, journal: Journal) -> Self {
        Self {
            surface,
            journal,
            series: BTreeMap::new(),
            size: SurfaceSize::new(0, 0),
            disposed: false,
            on_set_data: None,
        }
    }

    /// Runs `hook` inside every `set_data`, after the data is stored.
    pub fn with_data_hook(mut self, hook: impl FnMut(SeriesId) + 'static) -> Self {
        self.on_set_data = Some(Box::new(hook));
        self
    }

    fn record(&self, call: BackendCall) {
        self.journal.borrow_mut().push(call);
    }

    fn check_live(&self) -> Result<(), RenderError> {
        if self.disposed {
            Err(RenderError::SurfaceDisposed)
        } else {
            Ok(())
        }
    }

    pub fn data(&self, id: SeriesId) -> Option<&SeriesData> {
        self.series.get(&id).map(|(_, data)| data)
    }

    pub fn style(&self, id: SeriesId) -> Option<SeriesStyle> {
        self.series.get(&id).map(|(style, _)| *style)
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_series(&mut self, id: SeriesId, style: SeriesStyle) -> Result<(), RenderError> {
        self.check_live()?;
        if self.series.contains_key(&id) {
            return Err(RenderError::Backend(format!("{} already exists", id)));
        }
        self.series.insert(id, (style, SeriesData::Points(Vec::new())));
        self.record(BackendCall::Create {
            surface: self.surface,
            id,
            kind: style.kind,
            scale: style.scale,
        });
        Ok(())
    }

    fn set_data(&mut self, id: SeriesId, data: SeriesData) -> Result<(), RenderError> {
        self.check_live()?;
        let len = data.len();
        let entry = self
            .series
            .get_mut(&id)
            .ok_or_else(|| RenderError::Backend(format!("{} does not exist", id)))?;
        entry.1 = data;
        self.record(BackendCall::SetData {
            surface: self.surface,
            id,
            len,
        });
        if let Some(hook) = self.on_set_data.as_mut() {
            hook(id);
        }
        Ok(())
    }

    fn remove_series(&mut self, id: SeriesId) -> Result<(), RenderError> {
        self.check_live()?;
        self.series
            .remove(&id)
            .ok_or_else(|| RenderError::Backend(format!("{} does not exist", id)))?;
        self.record(BackendCall::Remove {
            surface: self.surface,
            id,
        });
        Ok(())
    }

    fn configure_scale(&mut self, scale: PriceScaleId, region: ScaleRegion) -> Result<(), RenderError> {
        self.check_live()?;
        self.record(BackendCall::ConfigureScale {
            surface: self.surface,
            scale,
            region,
        });
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        self.check_live()?;
        self.size = size;
        self.record(BackendCall::Resize {
            surface: self.surface,
            size,
        });
        Ok(())
    }

    fn fit_content(&mut self) -> Result<(), RenderError> {
        self.check_live()?;
        self.record(BackendCall::FitContent {
            surface: self.surface,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.series.clear();
        self.record(BackendCall::Dispose {
            surface: self.surface,
        });
    }
}
