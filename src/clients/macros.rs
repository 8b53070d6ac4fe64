#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $key:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self, key), fields(key = %key))]
                pub async fn [<find_ $entity_name_snake>](&self, key: $key) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(key).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self, key), fields(key = %key))]
                pub async fn [<delete_ $entity_name_snake>](&self, key: $key) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(key).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.list().await.map_err(<$error>::from)
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty, $error:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }

            /// Stop every shard behind this client and return what they held.
            #[tracing::instrument(skip(self))]
            pub async fn shutdown(&self) -> Result<Vec<$entity>, $error> {
                tracing::debug!("Sending request");
                self.inner.shutdown().await.map_err(<$error>::from)
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $key:ty, $error:ty, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity, $error);
        $crate::impl_client_methods!($client_name, $entity, $key, $error, $entity_name_snake);
    };
}
