use std::sync::Arc;

use desk_core::DeskApp;

pub struct DeskAxumState<P>
where
    P: Send + Clone + 'static,
{
    pub app: Arc<DeskApp<P>>,
}

impl<P> Clone for DeskAxumState<P>
where
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
        }
    }
}
