mod delivery_backend_factory;

pub use delivery_backend_factory::DeliveryBackendFactory;
