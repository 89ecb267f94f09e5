// Application layer - Use case interactors

pub mod analyze_interactor;
pub mod index_interactor;
pub mod inspect_interactor;

// Re-export interactors
pub use analyze_interactor::{AnalyzeInteractor, AnalyzeRequest};
pub use index_interactor::{IndexInteractor, IndexRequest, IndexResponse};
pub use inspect_interactor::{InspectInteractor, InspectRequest, InspectResponse};
